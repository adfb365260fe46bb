pub mod export_service;
pub mod job_service;
pub mod scraper_service;
pub mod tiktok_service;
pub mod twitch_service;
pub mod web_server;
pub mod youtube_service;
