// PromptReel MP4 Encoder
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Streams raw RGB frames into the system ffmpeg binary over stdin.

use image::RgbImage;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use tracing::{debug, info};

use crate::error::{GenError, GenResult};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn new(out_path: impl Into<PathBuf>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    pub fn validate(&self) -> GenResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GenError::validation("encode width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(GenError::validation("encode fps must be non-zero"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            // yuv420p needs even dimensions.
            return Err(GenError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> GenResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    frames: u64,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> GenResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(GenError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-preset",
            "medium",
            "-crf",
            "20",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        debug!("[ENCODE] {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| {
            GenError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GenError::encode("failed to open ffmpeg stdin"))?;

        info!(
            "[ENCODE] ffmpeg started (pid {}): {}x{} @ {}fps -> {:?}",
            child.id(),
            cfg.width,
            cfg.height,
            cfg.fps,
            cfg.out_path
        );

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
            frames: 0,
        })
    }

    pub fn encode_frame(&mut self, frame: &RgbImage) -> GenResult<()> {
        if frame.width() != self.cfg.width || frame.height() != self.cfg.height {
            return Err(GenError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(GenError::encode("ffmpeg encoder is already finalized"));
        };

        stdin
            .write_all(frame.as_raw())
            .map_err(|e| GenError::encode(format!("failed to write frame to ffmpeg stdin: {e}")))?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn finish(mut self) -> GenResult<PathBuf> {
        drop(self.stdin.take());

        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        let status = self
            .child
            .wait()
            .map_err(|e| GenError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;

        if !status.success() {
            return Err(GenError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        info!("[ENCODE] {} frames written to {:?}", self.frames, self.cfg.out_path);
        Ok(self.cfg.out_path.clone())
    }
}

impl Drop for FfmpegEncoder {
    // Dropped before `finish`: stop ffmpeg and reap it.
    fn drop(&mut self) {
        if self.stdin.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
            debug!("[ENCODE] ffmpeg aborted after {} frames", self.frames);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(EncodeConfig::new("out.mp4", 0, 10, 15).validate().is_err());
        assert!(EncodeConfig::new("out.mp4", 11, 10, 15).validate().is_err());
        assert!(EncodeConfig::new("out.mp4", 10, 10, 0).validate().is_err());
        assert!(EncodeConfig::new("out.mp4", 1024, 1024, 15).validate().is_ok());
    }

    #[test]
    fn encodes_a_short_clip_when_ffmpeg_present() {
        if !is_ffmpeg_on_path() {
            eprintln!("skipping: ffmpeg not on PATH");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("clip.mp4");
        let mut enc = FfmpegEncoder::new(EncodeConfig::new(&out, 32, 32, 10)).unwrap();
        for i in 0..10u8 {
            let frame = RgbImage::from_pixel(32, 32, image::Rgb([i * 20, 0, 255 - i * 20]));
            enc.encode_frame(&frame).unwrap();
        }
        assert_eq!(enc.frames_written(), 10);
        assert!(enc.encode_frame(&RgbImage::new(8, 8)).is_err());
        let path = enc.finish().unwrap();
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn dropping_mid_stream_reaps_ffmpeg() {
        if !is_ffmpeg_on_path() {
            eprintln!("skipping: ffmpeg not on PATH");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let mut enc = FfmpegEncoder::new(EncodeConfig::new(dir.path().join("cut.mp4"), 32, 32, 10)).unwrap();
        enc.encode_frame(&RgbImage::new(32, 32)).unwrap();
        let pid = enc.pid();
        assert!(Path::new(&format!("/proc/{pid}")).exists());

        drop(enc);
        // No zombie left behind.
        assert!(!Path::new(&format!("/proc/{pid}")).exists());
    }
}
