#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use jobscrape_api::config::ServerConfig;
use jobscrape_api::router::build_app_router;
use jobscrape_api::state::AppState;
use jobscrape_core::scraper::command::ScraperCommand;

/// Build a test `ServerConfig` rooted in `dir`.
///
/// Results live in `dir/output` and the scraper is `bash dir/scraper.sh`
/// run with `dir` as its working directory, so a script writing to
/// `output/` lands in the store.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        output_dir: dir.join("output"),
        scraper: ScraperCommand {
            program: "bash".to_string(),
            base_args: vec![dir.join("scraper.sh").to_string_lossy().into_owned()],
            working_directory: Some(dir.to_path_buf()),
            timeout: Duration::from_secs(10),
        },
    }
}

/// A full application over a temporary output directory and a scripted
/// scraper stand-in.
pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    /// Build the app with `scraper_body` as the body of the bash scraper.
    pub fn new(scraper_body: &str) -> Self {
        Self::with_config(scraper_body, |_| {})
    }

    /// Like [`TestApp::new`], letting `adjust` change the test config first.
    pub fn with_config(scraper_body: &str, adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("scraper.sh"),
            format!("#!/bin/bash\n{scraper_body}"),
        )
        .expect("write scraper script");

        let mut config = test_config(dir.path());
        adjust(&mut config);
        let state = AppState::new(config.clone());
        let router = build_app_router(state.clone(), &config);

        Self { dir, state, router }
    }

    /// App whose scraper exits immediately without output.
    pub fn idle() -> Self {
        Self::new("exit 0\n")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    /// Write a result file of `records` into the output directory.
    pub fn write_result(&self, name: &str, records: &serde_json::Value) {
        std::fs::create_dir_all(self.output_dir()).expect("create output dir");
        std::fs::write(
            self.output_dir().join(name),
            serde_json::to_vec_pretty(records).expect("serialize"),
        )
        .expect("write result file");
    }

    /// Write raw bytes as a result file.
    pub fn write_raw(&self, name: &str, bytes: &[u8]) {
        std::fs::create_dir_all(self.output_dir()).expect("create output dir");
        std::fs::write(self.output_dir().join(name), bytes).expect("write result file");
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// `n` job records as the scraper writes them.
pub fn sample_jobs(n: usize) -> serde_json::Value {
    serde_json::Value::Array(
        (0..n)
            .map(|i| {
                serde_json::json!({
                    "title": format!("Software Engineer {i}"),
                    "company": "Acme",
                    "location": "Seattle, WA",
                    "date_posted": "2025-01-01",
                    "link": format!("https://www.linkedin.com/jobs/view/{i}"),
                })
            })
            .collect(),
    )
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a form-urlencoded body.
pub async fn post_form(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Poll `/api/scraper/status` until the run leaves `running`.
pub async fn wait_for_outcome(app: &Router) -> serde_json::Value {
    for _ in 0..200 {
        let json = body_json(get(app.clone(), "/api/scraper/status").await).await;
        let state = json["status"]["state"].as_str().unwrap_or_default().to_string();
        if state != "running" && state != "idle" {
            return json["status"].clone();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("scrape did not finish");
}
