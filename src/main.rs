use anyhow::Result;
use futures_util::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sse_replay::config::Settings;
use sse_replay::fixtures;
use sse_replay::repository::FixtureRepository;
use sse_replay::stream::{stream_from_repository, PlaybackOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone())),
        )
        .init();

    info!(
        fixture = %settings.playback.fixture,
        delay_profile = %settings.playback.delay_profile,
        "Starting fixture replay"
    );

    let mut repository = FixtureRepository::new();
    fixtures::register_demo_fixtures(&mut repository)?;

    let playback = PlaybackOptions {
        delay_profile: settings.playback.delay_profile,
        session_id: None,
        enrich_events: Some(settings.playback.enrich_events),
    };
    let mut stream = stream_from_repository(&repository, &settings.playback.fixture, playback);

    while let Some(item) = stream.next().await {
        match item {
            Ok(emitted) => {
                // Standard SSE framing: an event line, a data line, a blank line
                println!("event: {}", emitted.event.payload.kind());
                println!("data: {}\n", serde_json::to_string(&emitted)?);
            }
            Err(error) => {
                eprintln!("stream error: {error}");
                break;
            }
        }
    }

    info!("Replay complete");
    Ok(())
}
