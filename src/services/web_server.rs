use crate::models::job::{JobEvent, ScrapeRequest};
use crate::models::settings::AppState;
use crate::services::export_service;
use crate::services::scraper_service::InfluencerScraper;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::{error, info};
use rust_embed::RustEmbed;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use warp::http::StatusCode;
use warp::Filter;

// Control panel assets, embedded at compile time
#[derive(RustEmbed)]
#[folder = "webui/"]
#[prefix = ""]
pub struct WebUiAssets;

/// Starts the HTTP server and blocks until shutdown.
pub async fn run(state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.settings.server.host, state.settings.server.port)
        .parse()?;

    let with_state = {
        let state = state.clone();
        warp::any().map(move || state.clone())
    };

    let run_scraper = warp::path!("api" / "run" / "influencer-scraper")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state.clone())
        .and_then(handle_run);

    let logs = warp::path!("api" / "logs")
        .and(warp::get())
        .and(with_state.clone())
        .and_then(handle_logs);

    let files = warp::path!("api" / "files")
        .and(warp::get())
        .and(with_state.clone())
        .and_then(handle_files);

    let download = warp::path!("download" / String)
        .and(warp::get())
        .and(with_state)
        .and_then(handle_download);

    let assets = warp::get().and(warp::path::tail()).and_then(serve_asset);

    let routes = run_scraper
        .or(logs)
        .or(files)
        .or(download)
        .or(assets)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_header("content-type")
                .allow_methods(vec!["GET", "POST", "OPTIONS"]),
        );

    info!("[Server] Listening on http://{}", addr);
    warp::serve(routes).run(addr).await;
    Ok(())
}

fn json_reply(status: StatusCode, value: &serde_json::Value) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn error_reply(status: StatusCode, detail: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    json_reply(status, &serde_json::json!({ "detail": detail }))
}

async fn handle_run(
    request: ScrapeRequest,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    if request.keyword.trim().is_empty() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Keyword required"));
    }
    if request.platforms.is_empty() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            "Select at least one platform",
        ));
    }

    if state
        .jobs
        .begin(&request.keyword, &request.platforms)
        .await
        .is_err()
    {
        return Ok(error_reply(
            StatusCode::CONFLICT,
            "A job is already running",
        ));
    }

    state
        .jobs
        .log(format!("Starting search for '{}'", request.keyword));
    state
        .jobs
        .log(format!("Platforms: {}", request.platforms.join(", ")));

    tokio::spawn(run_scrape_job(state.clone(), request));

    Ok(json_reply(StatusCode::OK, &serde_json::json!({ "ok": true })))
}

/// The spawned scrape task. Any failure is surfaced as a job-level
/// error event; the server itself never goes down with it.
async fn run_scrape_job(state: AppState, request: ScrapeRequest) {
    match scrape(&state, &request).await {
        Ok(output) => {
            state.jobs.log("Finished successfully");
            state.jobs.log(format!("File created: {}", output));
            state.jobs.finish(&output).await;
        }
        Err(e) => {
            error!("[Server] Scrape job failed: {:#}", e);
            state.jobs.fail(&e.to_string()).await;
        }
    }
}

async fn scrape(state: &AppState, request: &ScrapeRequest) -> Result<String> {
    state.jobs.log("Initializing scraper...");
    let scraper = InfluencerScraper::new(&state.settings.credentials).await;

    state.jobs.log("Searching...");
    let results = scraper
        .search_all_platforms(
            &request.keyword,
            &request.platforms,
            request.max_results,
            request.min_followers_yt,
            request.min_followers_tw,
        )
        .await;
    state.jobs.log(format!("{} influencers found", results.len()));

    let filename = export_service::export_filename(&request.keyword);
    let path = Path::new(&state.settings.export_dir).join(&filename);
    export_service::export_to_csv(&results, &path)?;

    Ok(filename)
}

async fn handle_logs(state: AppState) -> Result<impl warp::Reply, warp::Rejection> {
    // replay the current job status to a freshly connected client
    let replay: Vec<JobEvent> = state
        .jobs
        .current()
        .await
        .map(JobEvent::Status)
        .into_iter()
        .collect();

    let events = stream::iter(replay)
        .chain(stream::unfold(state, |state| async move {
            let event = state.jobs.next_event().await;
            event.map(|event| (event, state))
        }))
        .map(|event| Ok::<_, Infallible>(sse_event(&event)));

    Ok(warp::sse::reply(
        warp::sse::keep_alive()
            .interval(Duration::from_secs(30))
            .text("heartbeat")
            .stream(events),
    ))
}

fn sse_event(event: &JobEvent) -> warp::sse::Event {
    warp::sse::Event::default()
        .event(event.name())
        .data(event.payload().to_string())
}

async fn handle_files(state: AppState) -> Result<impl warp::Reply, warp::Rejection> {
    let files = list_exports(Path::new(&state.settings.export_dir));
    Ok(warp::reply::json(&serde_json::json!({ "files": files })))
}

fn list_exports(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.ends_with(".csv"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

async fn handle_download(
    filename: String,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    // only bare filenames inside the export dir are served
    let name = Path::new(&filename)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(warp::reject::not_found)?;

    let path = Path::new(&state.settings.export_dir).join(&name);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| warp::reject::not_found())?;

    warp::http::Response::builder()
        .header("Content-Type", "text/csv")
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", name),
        )
        .body(bytes)
        .map_err(|_| warp::reject::not_found())
}

async fn serve_asset(path: warp::path::Tail) -> Result<impl warp::Reply, warp::Rejection> {
    let path_str = path.as_str();
    let file_path = if path_str.is_empty() || path_str == "/" {
        "index.html"
    } else {
        path_str
    };

    if let Some(file) = WebUiAssets::get(file_path) {
        let mime = mime_guess::from_path(file_path)
            .first_or_octet_stream()
            .to_string();

        return Ok(warp::reply::with_header(
            file.data.into_owned(),
            "Content-Type",
            mime,
        ));
    }

    // unknown paths fall back to the control panel page
    if let Some(index) = WebUiAssets::get("index.html") {
        return Ok(warp::reply::with_header(
            index.data.into_owned(),
            "Content-Type",
            "text/html".to_string(),
        ));
    }

    Err(warp::reject::not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_list_exports_only_csv() {
        let dir = std::env::temp_dir().join(format!("creatorscout_files_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("influencers_gaming.csv"), "x").unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();

        let files = list_exports(&dir);
        assert_eq!(files, vec!["influencers_gaming.csv".to_string()]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_list_exports_missing_dir() {
        assert!(list_exports(Path::new("/nonexistent/creatorscout")).is_empty());
    }

    #[test]
    fn test_embedded_index_present() {
        assert!(WebUiAssets::get("index.html").is_some());
    }
}
