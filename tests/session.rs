//! Drives the interactive menu with scripted console input.

mod common;

use axum::routing::get;
use axum::Router;
use common::{png_bytes, serve, settings_in, write_png, StubAnalyzer};
use image_service::session::MENU;
use image_service::{AnalysisResult, Session, Settings};

async fn run_session(script: &str, analyzer: StubAnalyzer, settings: Settings) -> String {
    let mut session = Session::new(
        script.as_bytes(),
        Vec::new(),
        analyzer,
        reqwest::Client::new(),
        settings,
    );
    session.run().await.unwrap();
    String::from_utf8(session.into_output()).unwrap()
}

#[tokio::test]
async fn missing_file_reports_and_shows_menu_again() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.jpg");
    let script = format!("1\n{}\n0\n", missing.display());

    let output = run_session(
        &script,
        StubAnalyzer::returning(common::sample_result()),
        settings_in(dir.path()),
    )
    .await;

    assert!(output.contains("File not found. Please check the path and try again."));
    assert_eq!(output.matches(MENU).count(), 2);
    assert!(!output.contains("Analyzing"));
}

#[tokio::test]
async fn directory_path_is_reported_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!("1\n{}\n0\n", dir.path().display());

    let output = run_session(
        &script,
        StubAnalyzer::returning(common::sample_result()),
        settings_in(dir.path()),
    )
    .await;

    assert!(output.contains("File not found. Please check the path and try again."));
    assert!(!output.contains("Analyzing"));
}

#[tokio::test]
async fn invalid_choice_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_session(
        "7\nhello\n0\n",
        StubAnalyzer::failing(),
        settings_in(dir.path()),
    )
    .await;

    assert_eq!(output.matches("Invalid choice, please try again.").count(), 2);
    assert_eq!(output.matches(MENU).count(), 3);
}

#[tokio::test]
async fn end_of_input_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_session("", StubAnalyzer::failing(), settings_in(dir.path())).await;
    assert_eq!(output.trim_end(), MENU);
}

#[tokio::test]
async fn analyzes_file_and_creates_thumbnail() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(&dir.path().join("dog.png"), 64, 32);
    let settings = settings_in(dir.path());
    let script = format!("1\n{}\ny\n100\n50\nt.jpg\n0\n", image.display());

    let output = run_session(
        &script,
        StubAnalyzer::returning(common::sample_result()),
        settings.clone(),
    )
    .await;

    assert!(output.contains(&format!("Analyzing {}", image.display())));
    assert_eq!(output.matches("(Confidence: ").count(), 6);
    assert!(output.contains(" - a dog in a park (Confidence: 87.65%)"));
    assert!(output.contains(" - dog (Confidence: 62.00%)"));
    assert!(settings
        .bounding_box_directory
        .join("output_with_bounding_boxes.jpg")
        .exists());

    let thumbnail_path = settings.thumbnail_directory.join("t.jpg");
    assert!(output.contains(&format!(
        "Thumbnail created and saved in {}",
        thumbnail_path.display()
    )));
    let thumbnail = image::open(&thumbnail_path).unwrap();
    assert_eq!((thumbnail.width(), thumbnail.height()), (100, 50));
}

#[tokio::test]
async fn declining_thumbnail_skips_it() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(&dir.path().join("dog.png"), 16, 16);
    let settings = settings_in(dir.path());
    let script = format!("1\n{}\nN\n0\n", image.display());

    let output = run_session(
        &script,
        StubAnalyzer::returning(AnalysisResult::default()),
        settings.clone(),
    )
    .await;

    assert!(output.contains("Do you want to create a thumbnail? (y/n)"));
    assert!(!output.contains("Enter the width of the thumbnail:"));
    assert!(!settings.thumbnail_directory.exists());
    assert!(!settings.bounding_box_directory.exists());
}

#[tokio::test]
async fn non_numeric_thumbnail_width_is_reported_and_loop_continues() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(&dir.path().join("dog.png"), 16, 16);
    let settings = settings_in(dir.path());
    let script = format!("1\n{}\ny\nabc\n0\n", image.display());

    let output = run_session(
        &script,
        StubAnalyzer::returning(AnalysisResult::default()),
        settings.clone(),
    )
    .await;

    assert!(output.contains("Error: invalid width \"abc\""));
    assert!(!output.contains("Enter the height of the thumbnail:"));
    assert_eq!(output.matches(MENU).count(), 2);
    assert!(!settings.thumbnail_directory.join("t.jpg").exists());
}

#[tokio::test]
async fn analysis_failure_is_reported_and_loop_continues() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(&dir.path().join("dog.png"), 16, 16);
    let script = format!("1\n{}\n0\n", image.display());

    let output = run_session(&script, StubAnalyzer::failing(), settings_in(dir.path())).await;

    assert!(output.contains("Error: image analysis failed: quota exceeded"));
    assert_eq!(output.matches(MENU).count(), 2);
}

#[tokio::test]
async fn url_image_is_downloaded_then_analyzed() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let base = serve(Router::new().route("/cat.png", get(|| async { png_bytes(24, 12) }))).await;
    let script = format!("2\n{base}/cat.png\nn\n0\n");

    let output = run_session(
        &script,
        StubAnalyzer::returning(common::sample_result()),
        settings.clone(),
    )
    .await;

    assert!(output.contains(&format!(
        "Image downloaded and saved as {}",
        settings.download_path.display()
    )));
    assert!(output.contains(&format!("Analyzing {}", settings.download_path.display())));
    let bytes = std::fs::read(&settings.download_path).unwrap();
    let downloaded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((downloaded.width(), downloaded.height()), (24, 12));
}

#[tokio::test]
async fn failed_download_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let base = serve(Router::new()).await;
    let script = format!("2\n{base}/missing.png\n0\n");

    let output = run_session(
        &script,
        StubAnalyzer::returning(common::sample_result()),
        settings_in(dir.path()),
    )
    .await;

    assert!(output.contains("Error: failed to download"));
    assert!(!output.contains("Analyzing"));
}
