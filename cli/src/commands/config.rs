//! Config command - show and update settings.

use anyhow::Result;
use portwatch_core::ConfigStore;

pub async fn show(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Config file: {}", store.path().display());
    println!("Refresh interval: {}s", config.refresh_interval);
    println!("lsof program: {}", config.lsof_path);
    Ok(())
}

pub async fn set_interval(store: &ConfigStore, secs: u64) -> Result<()> {
    store.set_refresh_interval(secs).await?;
    println!("Refresh interval set to {}s", secs);
    Ok(())
}

pub async fn set_lsof(store: &ConfigStore, path: String) -> Result<()> {
    store.set_lsof_path(path.clone()).await?;
    println!("lsof program set to {}", path);
    Ok(())
}
