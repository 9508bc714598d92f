// PromptReel Health Checks
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Dependency probes shared by `GET /api/health` and the `doctor` command.

use serde::Serialize;
use std::path::Path;
use tracing::{error, warn};

use crate::state::StudioState;
use crate::video::encoder::is_ffmpeg_on_path;

/// Health of one dependency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum SubsystemStatus {
    Healthy,
    Degraded(String),
    Down(String),
}

impl SubsystemStatus {
    pub fn is_down(&self) -> bool {
        matches!(self, SubsystemStatus::Down(_))
    }

    fn label(&self) -> &'static str {
        match self {
            SubsystemStatus::Healthy => "OK",
            SubsystemStatus::Degraded(_) => "WARN",
            SubsystemStatus::Down(_) => "DOWN",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub ffmpeg: SubsystemStatus,
    pub database: SubsystemStatus,
    pub font: SubsystemStatus,
    pub images_dir: SubsystemStatus,
    pub videos_dir: SubsystemStatus,
}

impl HealthReport {
    /// Video generation needs ffmpeg, the database and writable media dirs.
    pub fn is_healthy(&self) -> bool {
        ![
            &self.ffmpeg,
            &self.database,
            &self.images_dir,
            &self.videos_dir,
        ]
        .iter()
        .any(|s| s.is_down())
    }

    pub fn status_report(&self) -> String {
        let line = |name: &str, s: &SubsystemStatus| match s {
            SubsystemStatus::Healthy => format!("  {:<10} {}", name, s.label()),
            SubsystemStatus::Degraded(d) | SubsystemStatus::Down(d) => {
                format!("  {:<10} {} ({})", name, s.label(), d)
            }
        };
        [
            "PromptReel Health Report".to_string(),
            line("ffmpeg", &self.ffmpeg),
            line("database", &self.database),
            line("font", &self.font),
            line("images", &self.images_dir),
            line("videos", &self.videos_dir),
        ]
        .join("\n")
    }
}

pub async fn check(state: &StudioState) -> HealthReport {
    let ffmpeg = match tokio::task::spawn_blocking(is_ffmpeg_on_path).await {
        Ok(true) => SubsystemStatus::Healthy,
        Ok(false) => SubsystemStatus::Down("ffmpeg not found on PATH".to_string()),
        Err(e) => SubsystemStatus::Down(format!("probe failed: {}", e)),
    };

    let database = match state.db.health_check().await {
        Ok(()) => SubsystemStatus::Healthy,
        Err(e) => {
            error!("[DB] Health check failed: {}", e);
            SubsystemStatus::Down(e.to_string())
        }
    };

    let font = if state.font.is_some() {
        SubsystemStatus::Healthy
    } else {
        SubsystemStatus::Degraded(format!(
            "{} not loaded; videos render without text",
            state.config.font_path.display()
        ))
    };

    let report = HealthReport {
        ffmpeg,
        database,
        font,
        images_dir: check_writable(&state.config.media.images),
        videos_dir: check_writable(&state.config.media.videos),
    };
    if !report.is_healthy() {
        warn!("[SERVER] Degraded health:\n{}", report.status_report());
    }
    report
}

/// Can we create and remove a file in `dir`?
fn check_writable(dir: &Path) -> SubsystemStatus {
    let probe = dir.join(".promptreel_health_check");
    match std::fs::write(&probe, b"ok") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            SubsystemStatus::Healthy
        }
        Err(e) => SubsystemStatus::Down(format!("{} not writable: {}", dir.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_probe() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(check_writable(dir.path()), SubsystemStatus::Healthy);
        assert!(check_writable(&dir.path().join("missing")).is_down());
        assert!(!dir.path().join(".promptreel_health_check").exists());
    }

    #[test]
    fn font_alone_does_not_make_unhealthy() {
        let report = HealthReport {
            ffmpeg: SubsystemStatus::Healthy,
            database: SubsystemStatus::Healthy,
            font: SubsystemStatus::Degraded("missing".into()),
            images_dir: SubsystemStatus::Healthy,
            videos_dir: SubsystemStatus::Healthy,
        };
        assert!(report.is_healthy());
        assert!(report.status_report().contains("font       WARN (missing)"));

        let down = HealthReport {
            ffmpeg: SubsystemStatus::Down("gone".into()),
            ..report
        };
        assert!(!down.is_healthy());
    }

    #[test]
    fn status_serializes_tagged() {
        let json = serde_json::to_value(SubsystemStatus::Down("x".into())).unwrap();
        assert_eq!(json["status"], "down");
        assert_eq!(json["detail"], "x");
    }
}
