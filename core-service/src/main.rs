//! damage-inspect - Offline Inspection Entry Point
//!
//! Usage:
//!   damage-inspect <image-request.json>
//!   damage-inspect --video <video-request.json>
//!
//! Scoring config, model and webhook come from the same environment
//! variables the server reads.

use damage_core::constants::{APP_NAME, APP_VERSION};
use damage_core::{ImageInspection, InspectionOutcome, Runtime, VideoInspection};

const USAGE: &str = "usage: damage-inspect [--video] <request.json>";

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (video, path) = match args.as_slice() {
        [flag, path] if flag == "--video" => (true, path),
        [path] => (false, path),
        _ => return Err(USAGE.into()),
    };

    log::info!("{} v{}", APP_NAME, APP_VERSION);

    let runtime = Runtime::from_env()?;
    let content = std::fs::read_to_string(path)?;

    let mut outcome: InspectionOutcome = if video {
        let request: VideoInspection = serde_json::from_str(&content)?;
        runtime.pipeline.inspect_replay(&request)?
    } else {
        let request: ImageInspection = serde_json::from_str(&content)?;
        runtime.pipeline.inspect_image(&request)?
    };

    println!("{}", serde_json::to_string_pretty(&outcome.report)?);

    // Wait here: the process would otherwise exit before delivery
    if let Some(handle) = runtime.pipeline.schedule(&mut outcome) {
        if let Err(e) = handle.wait().await {
            log::warn!("Notification not delivered: {}", e);
        }
    }

    Ok(())
}
