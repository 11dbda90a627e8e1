use anyhow::{Context, Result};
use image_service::config::{Settings, DEFAULT_SETTINGS_FILE};
use image_service::{create_vision_client, Session};
use std::{env, io};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();

    let settings_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let working_dir = env::current_dir().context("cannot determine working directory")?;
    let settings = Settings::load(&settings_path)?.resolve(&working_dir);

    let vision_client = create_vision_client(&settings)?;
    let http = reqwest::Client::new();

    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout(), vision_client, http, settings);
    session.run().await
}
