//! Integration tests for triggering the scraper and observing its outcome.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_form, post_json, sample_jobs, wait_for_outcome, TestApp};
use serde_json::json;

/// Scraper stand-in that records its arguments, writes a result file and
/// announces it the way the real scraper does.
const ANNOUNCING_SCRAPER: &str = r#"printf '%s\n' "$@" > args.txt
mkdir -p output
cat > output/engineer_ny_Mar15_2030_1430.json <<'JSON'
[{"title": "Engineer", "company": "Acme", "location": "NY", "date_posted": "2030-03-15", "link": "https://example.com/1"}]
JSON
echo "Scraped 1 jobs"
echo "Results saved to output/engineer_ny_Mar15_2030_1430.json"
"#;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_title_is_rejected_without_launching() {
    let app = TestApp::new("touch launched\n");

    let response = post_json(
        app.app(),
        "/run-scraper",
        json!({ "title": "", "location": "NY" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Job title and location are required");

    let status = body_json(get(app.app(), "/api/scraper/status").await).await;
    assert_eq!(status["status"]["state"], "idle");
    assert!(!app.dir.path().join("launched").exists());
}

#[tokio::test]
async fn missing_location_field_is_rejected() {
    let app = TestApp::idle();

    let response = post_json(app.app(), "/run-scraper", json!({ "title": "Engineer" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn overlong_title_is_rejected() {
    let app = TestApp::idle();

    let response = post_json(
        app.app(),
        "/run-scraper",
        json!({ "title": "x".repeat(101), "location": "NY" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn malformed_json_body_is_rejected() {
    let app = TestApp::idle();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/run-scraper")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"title\": "))
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.app(), request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Trigger and completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trigger_returns_202_and_completes_with_new_file() {
    let app = TestApp::new(ANNOUNCING_SCRAPER);
    app.write_result("old_ny_Jan01_2024_0900.json", &sample_jobs(2));

    let response = post_json(
        app.app(),
        "/run-scraper",
        json!({ "title": "Engineer", "location": "NY", "experience": "3" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let trigger = body_json(response).await;
    assert_eq!(trigger["success"], true);
    assert_eq!(trigger["estimatedTime"], "Several minutes");
    let run_id = trigger["runId"].as_str().expect("runId").to_string();

    let status = wait_for_outcome(&app.router).await;
    assert_eq!(status["state"], "completed");
    assert_eq!(status["runId"], run_id.as_str());
    assert_eq!(status["file"], "engineer_ny_Mar15_2030_1430.json");

    let files = body_json(get(app.app(), "/api/files").await).await;
    assert_eq!(files["latest"], "engineer_ny_Mar15_2030_1430.json");

    let loaded = body_json(get(app.app(), "/jobs/engineer_ny_Mar15_2030_1430.json").await).await;
    assert_eq!(loaded["jobCount"], 1);
    assert_eq!(loaded["jobs"][0]["title"], "Engineer");

    let args = std::fs::read_to_string(app.dir.path().join("args.txt")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(
        args,
        vec!["--title=Engineer", "--location=NY", "--experience=3"]
    );
}

#[tokio::test]
async fn form_body_gets_the_same_async_contract() {
    let app = TestApp::new(ANNOUNCING_SCRAPER);

    let response = post_form(
        app.app(),
        "/run-scraper",
        "title=Senior+Engineer&location=New+York&experience=",
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(body_json(response).await["runId"].is_string());

    wait_for_outcome(&app.router).await;
    let args = std::fs::read_to_string(app.dir.path().join("args.txt")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args, vec!["--title=Senior Engineer", "--location=New York"]);
}

#[tokio::test]
async fn silent_scraper_is_detected_by_listing_diff() {
    let app = TestApp::new("echo '[]' > output/engineer_ny_Mar15_2030_1430.json\n");
    app.write_result("old_ny_Jan01_2024_0900.json", &sample_jobs(1));

    post_json(
        app.app(),
        "/run-scraper",
        json!({ "title": "Engineer", "location": "NY" }),
    )
    .await;

    let status = wait_for_outcome(&app.router).await;
    assert_eq!(status["state"], "completed");
    assert_eq!(status["file"], "engineer_ny_Mar15_2030_1430.json");
}

#[tokio::test]
async fn failing_scraper_reports_failed_state() {
    let app = TestApp::new("echo 'chromedriver not found' >&2\nexit 1\n");

    let response = post_json(
        app.app(),
        "/run-scraper",
        json!({ "title": "Engineer", "location": "NY" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let status = wait_for_outcome(&app.router).await;
    assert_eq!(status["state"], "failed");
    assert_eq!(status["exitCode"], 1);
    assert!(status["stderrTail"]
        .as_str()
        .unwrap()
        .contains("chromedriver not found"));

    // The server keeps serving after a failed scrape.
    let health = body_json(get(app.app(), "/health").await).await;
    assert_eq!(health["scraper"], "failed");
}

#[tokio::test]
async fn scraper_over_its_budget_reports_timed_out() {
    let app = TestApp::with_config("exec sleep 30\n", |config| {
        config.scraper.timeout = std::time::Duration::from_millis(300);
    });

    let response = post_json(
        app.app(),
        "/run-scraper",
        json!({ "title": "Engineer", "location": "NY" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let run_id = body_json(response).await["runId"].clone();

    let status = wait_for_outcome(&app.app()).await;
    assert_eq!(status["state"], "timed_out");
    assert_eq!(status["runId"], run_id);
    assert!(status["elapsedMs"].as_u64().unwrap() >= 300);
}

// ---------------------------------------------------------------------------
// Admission control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_trigger_while_running_returns_409() {
    let app = TestApp::new("exec sleep 5\n");
    let body = json!({ "title": "Engineer", "location": "NY" });

    let first = post_json(app.app(), "/run-scraper", body.clone()).await;
    assert_eq!(first.status(), StatusCode::ACCEPTED);

    let status = body_json(get(app.app(), "/api/scraper/status").await).await;
    assert_eq!(status["status"]["state"], "running");
    assert_eq!(status["status"]["request"]["title"], "Engineer");

    let second = post_json(app.app(), "/run-scraper", body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = body_json(second).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "CONFLICT");

    app.state
        .supervisor
        .shutdown(std::time::Duration::from_secs(5))
        .await;
}
