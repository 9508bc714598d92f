// PromptReel Generation Service
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// One request, one full cycle: validate, enhance, fetch keyframes,
// assemble on a blocking thread, then record the result.

use anyhow::anyhow;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::error::{GenError, GenResult};
use crate::media::generate_filename;
use crate::prompt::{enhance_prompt, validate_prompt};
use crate::state::StudioState;
use crate::storage::{GeneratedImage, GeneratedVideo};
use crate::video::pipeline::{assemble, AssemblyReport};

/// A rendered video not yet recorded in the catalog.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub prompt: String,
    pub enhanced_prompt: String,
    pub output: PathBuf,
    pub keyframes: Vec<String>,
    pub report: AssemblyReport,
    pub elapsed: Duration,
}

/// Run the pipeline and write the MP4, into the videos directory unless
/// `output` is given.
pub async fn render_video(state: &StudioState, raw_prompt: &str, output: Option<&Path>) -> GenResult<VideoJob> {
    let started = Instant::now();
    let prompt = validate_prompt(raw_prompt)?;
    let enhanced = enhance_prompt(&prompt);
    let seed = state.next_seed();
    info!("[GEN] Video request (seed {}): {:?}", seed, enhanced);

    let keyframes = state
        .generator
        .generate_keyframes(&enhanced, state.config.keyframes, seed)
        .await?;
    let keyframe_names: Vec<String> = keyframes.iter().map(|k| k.filename.clone()).collect();
    let images: Vec<DynamicImage> = keyframes
        .into_iter()
        .map(|k| DynamicImage::ImageRgb8(k.image))
        .collect();

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => state
            .config
            .media
            .videos
            .join(generate_filename("video", "mp4")),
    };

    let settings = state.config.video;
    let font = state.font.clone();
    let out = output.clone();
    let text = enhanced.clone();
    let assembled = tokio::task::spawn_blocking(move || assemble(&images, &text, &out, &settings, font, seed))
        .await
        .map_err(|e| GenError::Other(anyhow!("assembly task panicked: {e}")))
        .and_then(|r| r);
    let report = match assembled {
        Ok(report) => report,
        Err(e) => {
            discard(keyframe_paths(state, &keyframe_names));
            return Err(e);
        }
    };

    Ok(VideoJob {
        prompt,
        enhanced_prompt: enhanced,
        output,
        keyframes: keyframe_names,
        report,
        elapsed: started.elapsed(),
    })
}

/// Prompt to stored video row.
pub async fn generate_video(state: &StudioState, raw_prompt: &str) -> GenResult<GeneratedVideo> {
    let job = render_video(state, raw_prompt, None).await?;
    let filename = job
        .output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| GenError::Other(anyhow!("rendered video has no file name")))?;

    let inserted = state
        .db
        .insert_video(
            &job.prompt,
            &filename,
            job.elapsed.as_secs() as i64,
            job.report.duration_secs.round() as i64,
        )
        .await;
    let row = match inserted {
        Ok(row) => row,
        Err(e) => {
            error!("[DB] Could not record {}: {}", filename, e);
            let mut paths = keyframe_paths(state, &job.keyframes);
            paths.push(job.output);
            discard(paths);
            return Err(e.into());
        }
    };

    info!(
        "[GEN] Video #{} ready: {} ({}s, generated in {}s)",
        row.id, row.video_filename, row.video_length, row.generation_time
    );
    Ok(row)
}

/// Prompt to stored image row.
pub async fn generate_image(state: &StudioState, raw_prompt: &str) -> GenResult<GeneratedImage> {
    let started = Instant::now();
    let prompt = validate_prompt(raw_prompt)?;
    let enhanced = enhance_prompt(&prompt);
    let seed = state.next_seed();
    info!("[GEN] Image request (seed {}): {:?}", seed, enhanced);

    let keyframe = state.generator.generate_single(&enhanced, seed).await?;
    let row = state
        .db
        .insert_image(&prompt, &keyframe.filename, started.elapsed().as_secs() as i64)
        .await?;

    info!("[GEN] Image #{} ready: {} ({})", row.id, row.image_filename, keyframe.source);
    Ok(row)
}

fn keyframe_paths(state: &StudioState, names: &[String]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|n| state.config.media.images.join(n))
        .collect()
}

/// Remove what a failed video request left behind.
fn discard(paths: Vec<PathBuf>) {
    for path in paths {
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("[GEN] Could not remove {:?}: {}", path, e),
        }
    }
}
