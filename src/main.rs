use anyhow::{Context, Result};
use campus_records::config::Config;
use campus_records::logger;
use campus_records::service::Registrar;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    if let Some(path) = logger::setup(&config.logging)? {
        eprintln!("Logging to {}", path.display());
    }

    let registrar = Registrar::open(&config).await?;
    let dashboard = registrar.dashboard().await.context("Failed to load dashboard")?;

    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    Ok(())
}
