//! `halp token`

use super::{bootstrap, ServiceArg};
use halp_core::Credential;

/// Show the last characters of a secret only
fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

pub fn run(service: ServiceArg) -> anyhow::Result<()> {
    let mut session = bootstrap()?;

    let credential = match service {
        ServiceArg::Tempo => session.store.tempo_credential(&mut session.prompter)?,
        ServiceArg::Jira => session.store.jira_credential(&mut session.prompter)?,
    };

    print_credential(service, &credential);
    Ok(())
}

fn print_credential(service: ServiceArg, credential: &Credential) {
    let descriptor = service.descriptor();
    println!("🔑 {}", descriptor.description);
    println!("   User:    {}", credential.username);
    match credential.expires_at() {
        Some(at) => println!("   Expires: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("   Expires: {}", credential.expire),
    }
    println!("   Token:   {}", redact(credential.password()));
}
