//! `platconf platforms` command

use anyhow::Result;

use platconf::core::Platform;

pub fn execute() -> Result<()> {
    let width = Platform::ALL
        .iter()
        .map(|p| p.command().len())
        .max()
        .unwrap_or(0);

    for platform in Platform::ALL {
        let availability = if platform.is_available() {
            "available"
        } else {
            "unavailable on this host"
        };
        println!(
            "{:<width$}  {:<24}  generators: {}",
            platform.command(),
            availability,
            platform.descriptor().generators.join(", "),
            width = width
        );
    }

    Ok(())
}
