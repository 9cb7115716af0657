//! `halp backends`

use halp_core::{available_backends, pin_required, HalpContext};

pub fn run() -> anyhow::Result<()> {
    let ctx = HalpContext::detect()?;
    let backends = available_backends(&ctx.platform);

    println!("🔐 Secret backends ({:?})\n", ctx.platform.os);
    for (i, kind) in backends.iter().enumerate() {
        let marker = if i == 0 { "→" } else { " " };
        println!("  {} {}", marker, kind);
    }

    println!();
    if pin_required(&backends) {
        println!("📌 A 6 digit PIN is stored in your profile to unlock the file keyring.");
        println!("   Keyring files: {}", ctx.file_backend_dir().display());
    } else {
        println!("✅ No PIN needed; the system keyring authenticates you.");
    }
    Ok(())
}
