//! `halp delete`

use super::{bootstrap, DeleteArg};

pub fn run(service: DeleteArg) -> anyhow::Result<()> {
    let session = bootstrap()?;
    let descriptor = service.descriptor();

    session.store.delete(&descriptor)?;

    if descriptor.is_wildcard() {
        println!("🗑️  Deleted all stored tokens for {}", session.store.user());
    } else {
        println!(
            "🗑️  Deleted {} for {}",
            descriptor.description,
            session.store.user()
        );
    }
    Ok(())
}
