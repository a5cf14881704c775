use anyhow::Result;

pub fn run() -> Result<()> {
    println!("shadow {}", env!("CARGO_PKG_VERSION"));
    println!(
        "identity schema v{}",
        shadow_core::identity::SCHEMA_VERSION
    );
    Ok(())
}
