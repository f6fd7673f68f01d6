use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("caretaker version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
