// PromptReel Video Assembly
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Keyframes in, MP4 out: interpolate, apply the bucket's effect plan, draw
// hook text, stream to ffmpeg, then optionally lay a soundtrack under it.

use image::imageops::FilterType;
use image::{DynamicImage, Rgb32FImage, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::error::{GenError, GenResult};
use crate::prompt::{ContentBucket, ContentProfile};
use crate::video::audio::{self, AudioProfile};
use crate::video::effects::{EffectPlan, FrameContext};
use crate::video::encoder::{EncodeConfig, FfmpegEncoder};
use crate::video::hooks::{HookOverlay, SharedFont};
use crate::video::interpolate::{interpolate_frame, Ease};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_secs: u32,
    pub ease: Ease,
    pub audio: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            fps: 15,
            duration_secs: 10,
            ease: Ease::InOutCubic,
            audio: true,
        }
    }
}

impl VideoSettings {
    pub fn total_frames(&self) -> u32 {
        self.fps * self.duration_secs
    }

    pub fn validate(&self) -> GenResult<()> {
        if self.fps == 0 || self.duration_secs == 0 {
            return Err(GenError::config("video fps and duration must be non-zero"));
        }
        EncodeConfig::new("", self.width, self.height, self.fps)
            .validate()
            .map_err(|e| GenError::config(e.to_string()))
    }
}

/// What `assemble` produced.
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyReport {
    pub output: PathBuf,
    pub frames: u32,
    pub duration_secs: f32,
    pub bucket: ContentBucket,
    pub hook: String,
    pub has_audio: bool,
    pub elapsed: Duration,
}

/// Render `keyframes` into an MP4 at `output`.
///
/// On any error the partial output (and temporary audio files) are removed.
pub fn assemble(
    keyframes: &[DynamicImage],
    prompt: &str,
    output: &Path,
    settings: &VideoSettings,
    font: Option<SharedFont>,
    seed: u64,
) -> GenResult<AssemblyReport> {
    if keyframes.is_empty() {
        return Err(GenError::validation("cannot assemble a video without keyframes"));
    }
    settings.validate()?;

    let silent = if settings.audio {
        output.with_extension("silent.mp4")
    } else {
        output.to_path_buf()
    };
    let wav = output.with_extension("wav");

    let result = render(keyframes, prompt, output, &silent, &wav, settings, font, seed);

    if settings.audio {
        remove_quietly(&silent);
        remove_quietly(&wav);
    }
    if let Err(e) = &result {
        error!("[VIDEO] Assembly failed for {:?}: {}", output, e);
        remove_quietly(output);
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn render(
    keyframes: &[DynamicImage],
    prompt: &str,
    output: &Path,
    silent: &Path,
    wav: &Path,
    settings: &VideoSettings,
    font: Option<SharedFont>,
    seed: u64,
) -> GenResult<AssemblyReport> {
    let started = Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);

    let profile = ContentProfile::from_prompt(prompt);
    let plan = EffectPlan::for_profile(&profile);
    let overlay = HookOverlay::new(profile.bucket, font, &mut rng);
    let total = settings.total_frames();

    info!(
        "[VIDEO] Assembling {} frames from {} keyframes (bucket: {}, golden hour: {}, hook: {:?})",
        total,
        keyframes.len(),
        profile.bucket,
        profile.golden_hour,
        overlay.hook()
    );
    if !overlay.has_font() {
        warn!("[HOOKS] No font loaded; rendering without text overlays");
    }

    let prepared: Vec<Rgb32FImage> = keyframes
        .iter()
        .map(|k| {
            k.resize_exact(settings.width, settings.height, FilterType::Lanczos3)
                .to_rgb32f()
        })
        .collect();

    let mut encoder = FfmpegEncoder::new(EncodeConfig::new(
        silent,
        settings.width,
        settings.height,
        settings.fps,
    ))?;

    let log_every = (settings.fps * 2).max(1);
    let mut previous: Option<Rgb32FImage> = None;

    for idx in 0..total {
        let mut frame = interpolate_frame(&prepared, idx, total, settings.ease)?;
        plan.apply(
            &mut frame,
            FrameContext { index: idx, total },
            previous.as_ref(),
            &mut rng,
        );

        let mut rgb = to_rgb8(&frame);
        overlay.apply(&mut rgb, idx, total);
        encoder.encode_frame(&rgb)?;

        if idx % log_every == 0 {
            info!(
                "[VIDEO] Frame {}/{} ({:.0}%)",
                idx + 1,
                total,
                (idx + 1) as f32 * 100.0 / total as f32
            );
        }
        previous = Some(frame);
    }

    let frames = encoder.frames_written() as u32;
    encoder.finish()?;

    let mut has_audio = false;
    if settings.audio {
        let samples = audio::synthesize(
            &AudioProfile::for_bucket(profile.bucket),
            settings.duration_secs as f32,
            audio::SAMPLE_RATE,
            &mut rng,
        );
        audio::write_wav(wav, &samples, audio::SAMPLE_RATE)?;
        match audio::mux_audio(silent, wav, output) {
            Ok(()) => has_audio = true,
            Err(e) => {
                warn!("[AUDIO] {}; keeping silent video", e);
                std::fs::rename(silent, output)?;
            }
        }
    }

    let report = AssemblyReport {
        output: output.to_path_buf(),
        frames,
        duration_secs: frames as f32 / settings.fps as f32,
        bucket: profile.bucket,
        hook: overlay.hook().to_string(),
        has_audio,
        elapsed: started.elapsed(),
    };
    info!(
        "[VIDEO] Done: {:?} ({} frames, audio: {}) in {:.1}s",
        report.output,
        report.frames,
        report.has_audio,
        report.elapsed.as_secs_f32()
    );
    Ok(report)
}

/// Clamp float RGB back to 8-bit.
pub fn to_rgb8(frame: &Rgb32FImage) -> RgbImage {
    let mut out = RgbImage::new(frame.width(), frame.height());
    for (d, s) in out.iter_mut().zip(frame.iter()) {
        *d = (s.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    out
}

fn remove_quietly(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("[VIDEO] Could not remove {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::encoder::is_ffmpeg_on_path;
    use image::Rgb;

    fn tiny_settings(audio: bool) -> VideoSettings {
        VideoSettings {
            width: 64,
            height: 64,
            fps: 5,
            duration_secs: 2,
            ease: Ease::Linear,
            audio,
        }
    }

    #[test]
    fn default_settings_make_150_frames() {
        let s = VideoSettings::default();
        assert_eq!(s.total_frames(), 150);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn settings_reject_odd_or_zero() {
        let mut s = VideoSettings::default();
        s.width = 1023;
        assert!(s.validate().is_err());
        let mut s = VideoSettings::default();
        s.fps = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn rgb8_conversion_clamps() {
        let frame = Rgb32FImage::from_pixel(2, 1, Rgb([1.4, -0.2, 0.5]));
        let rgb = to_rgb8(&frame);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 128]);
    }

    #[test]
    fn empty_keyframes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("none.mp4");
        let err = assemble(&[], "a cat", &out, &tiny_settings(false), None, 1).unwrap_err();
        assert!(err.is_validation());
        assert!(!out.exists());
    }

    #[test]
    fn encode_failure_removes_output() {
        if !is_ffmpeg_on_path() {
            eprintln!("skipping: ffmpeg not on PATH");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        // ffmpeg starts, then refuses a container it cannot infer.
        let out = dir.path().join("reel.notavideo");
        std::fs::write(&out, b"stale").unwrap();
        let keys = vec![DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, image::Rgb([10, 20, 30])))];

        let err = assemble(&keys, "a lamp", &out, &tiny_settings(false), None, 9).unwrap_err();
        assert!(matches!(err, GenError::Encode(_)));
        assert!(!out.exists());
    }

    #[test]
    fn assembles_when_ffmpeg_present() {
        if !is_ffmpeg_on_path() {
            eprintln!("skipping: ffmpeg not on PATH");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reel.mp4");
        let keys = vec![
            DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, image::Rgb([200, 40, 40]))),
            DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, image::Rgb([40, 40, 200]))),
        ];
        let report = assemble(&keys, "waves at sunset", &out, &tiny_settings(true), None, 3).unwrap();
        assert_eq!(report.frames, 10);
        assert_eq!(report.bucket, ContentBucket::Water);
        assert!(out.exists());
        assert!(!out.with_extension("silent.mp4").exists());
        assert!(!out.with_extension("wav").exists());
    }
}
