use anyhow::Result;
use models::settings::{AppState, Settings};
use services::export_service;
use services::job_service::JobService;
use services::scraper_service::InfluencerScraper;
use services::web_server;
use log::warn;
use std::path::Path;
use std::sync::Arc;

mod models;
mod services;
mod utils;

/// Load settings from settings.json in the working directory
fn load_settings_from_file() -> Result<Settings, Box<dyn std::error::Error>> {
    let settings_path = Path::new("settings.json");
    if !settings_path.exists() {
        return Ok(Settings::default());
    }

    let json = std::fs::read_to_string(settings_path)?;
    let settings: Settings = serde_json::from_str(&json)?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let settings = load_settings_from_file().unwrap_or_else(|e| {
        warn!("[Main] Failed to load settings.json, using defaults: {}", e);
        Settings::default()
    });

    // positional args run one search and exit, no server
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return run_cli(&settings, &args).await;
    }

    let state = AppState {
        settings: Arc::new(settings),
        jobs: Arc::new(JobService::new()),
    };

    web_server::run(state).await
}

/// One-shot mode: CreatorScout <keyword> <platforms> <min_subscribers>
/// <min_followers> <limit>, platforms comma-separated.
async fn run_cli(settings: &Settings, args: &[String]) -> Result<()> {
    if args.len() != 5 {
        anyhow::bail!(
            "usage: CreatorScout <keyword> <platforms> <min_subscribers> <min_followers> <limit>"
        );
    }

    let keyword = &args[0];
    let platforms: Vec<String> = args[1]
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let min_subscribers: u64 = args[2].parse()?;
    let min_followers: u64 = args[3].parse()?;
    let limit: u64 = args[4].parse()?;

    println!("Searching '{}' on {}", keyword, platforms.join(", "));

    let scraper = InfluencerScraper::new(&settings.credentials).await;
    let results = scraper
        .search_all_platforms(keyword, &platforms, limit, min_subscribers, min_followers)
        .await;

    let path = Path::new(&settings.export_dir).join(export_service::export_filename(keyword));
    let written = export_service::export_to_csv(&results, &path)?;
    if written > 0 {
        println!("{} influencers exported to {}", written, path.display());
    } else {
        println!("No influencers found, nothing exported");
    }

    Ok(())
}
