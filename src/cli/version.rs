//! `halp version`

use super::bootstrap;
use chrono::Utc;
use semver::Version;

pub fn run() -> anyhow::Result<()> {
    let mut session = bootstrap()?;
    let running = Version::parse(env!("CARGO_PKG_VERSION"))?;
    let now = Utc::now();

    println!("Halp: v{}", running);
    println!(
        "Runtime: {}_{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    let stamp = session.profile.version_stamp()?;
    if let Some(at) = stamp.checked_at {
        println!("Last checked: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(next) = stamp.next_check() {
        println!("Next check: {}", next.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    if stamp.version.as_ref() != Some(&running) || stamp.is_stale(now) {
        session.profile.record_version(&running, now)?;
        tracing::debug!(
            path = %session.ctx.home().display(),
            version = %running,
            "Recorded version"
        );
    }
    Ok(())
}
