// PromptReel Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | PromptReel

use promptreel::config::AppConfig;
use promptreel::health;
use promptreel::media::clean_old_generated;
use promptreel::server;
use promptreel::service;
use promptreel::state::StudioState;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "promptreel")]
#[command(about = "Prompt-to-video studio", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on (overrides PROMPTREEL_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate one video from a prompt
    Generate {
        #[arg(short, long)]
        prompt: String,

        /// Write the MP4 here instead of the videos directory (not cataloged)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate one image from a prompt
    Image {
        #[arg(short, long)]
        prompt: String,
    },

    /// Delete generated media older than N days
    Cleanup {
        #[arg(short, long, default_value = "30")]
        days: u64,
    },

    /// Check external tools and directories
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,sqlx=warn,hyper=warn");
    }
    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PROMPTREEL PANIC] at {}: {}", location, message);
    }));

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            let addr = config.bind_addr();
            let state = Arc::new(StudioState::init(config).await?);
            server::start_server(&addr, state).await?;
        }
        Commands::Generate { prompt, output } => {
            let state = StudioState::init(config).await?;
            match output {
                Some(path) => {
                    let job = service::render_video(&state, &prompt, Some(&path)).await?;
                    info!(
                        "[VIDEO] Wrote {:?} ({} frames, bucket {}, hook {:?}) in {:.1}s",
                        job.output,
                        job.report.frames,
                        job.report.bucket,
                        job.report.hook,
                        job.elapsed.as_secs_f32()
                    );
                }
                None => {
                    let row = service::generate_video(&state, &prompt).await?;
                    let path = state.config.media.videos.join(&row.video_filename);
                    info!("[VIDEO] Video #{} saved to {:?}", row.id, path);
                }
            }
        }
        Commands::Image { prompt } => {
            let state = StudioState::init(config).await?;
            let row = service::generate_image(&state, &prompt).await?;
            let path = state.config.media.images.join(&row.image_filename);
            info!("[GEN] Image #{} saved to {:?}", row.id, path);
        }
        Commands::Cleanup { days } => {
            let max_age = Duration::from_secs(days * 24 * 60 * 60);
            let images = clean_old_generated(&config.media.images, max_age);
            let videos = clean_old_generated(&config.media.videos, max_age);
            info!(
                "[MEDIA] Removed {} image(s) and {} video(s) older than {} days",
                images, videos, days
            );
        }
        Commands::Doctor => {
            let state = StudioState::init(config).await?;
            let report = health::check(&state).await;
            println!("{}", report.status_report());
            if !report.is_healthy() {
                error!("[SERVER] Video generation is not possible until the DOWN items are fixed");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
