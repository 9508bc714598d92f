// PromptReel Media Files
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Filenames, directory layout and housekeeping for generated media.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use walkdir::WalkDir;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];

/// Prefixes of files this application creates and may sweep.
const GENERATED_PREFIXES: &[&str] = &["generated_", "fallback_", "video_"];

/// On-disk homes of generated images and videos.
#[derive(Debug, Clone)]
pub struct MediaDirs {
    pub images: PathBuf,
    pub videos: PathBuf,
}

impl MediaDirs {
    pub fn new(images: impl Into<PathBuf>, videos: impl Into<PathBuf>) -> Self {
        Self {
            images: images.into(),
            videos: videos.into(),
        }
    }

    pub fn ensure(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.images)?;
        fs::create_dir_all(&self.videos)?;
        Ok(())
    }
}

/// `{prefix}_{YYYYmmdd_HHMMSS}_{8 hex}.{ext}`
pub fn generate_filename(prefix: &str, ext: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}.{}", prefix, stamp, &id[..8], ext)
}

/// Check a client-supplied file name before it touches the filesystem.
pub fn validate_media_name(name: &str, allowed: &[&str]) -> Result<(), String> {
    if name.is_empty() {
        return Err("Access denied: empty file name".to_string());
    }
    if name.contains('/') || name.contains('\\') {
        return Err("Access denied: path separators are not allowed".to_string());
    }

    let path = Path::new(name);
    for component in path.components() {
        if !matches!(component, Component::Normal(_)) {
            return Err("Access denied: path traversal detected".to_string());
        }
    }

    if name.starts_with('.') {
        return Err("Access denied: hidden files are not served".to_string());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext {
        Some(e) if e == "svg" => Err("Access denied: SVG is not served".to_string()),
        Some(e) if allowed.contains(&e.as_str()) => Ok(()),
        Some(e) => Err(format!("Access denied: invalid file extension '.{}'", e)),
        None => Err("Access denied: no file extension provided".to_string()),
    }
}

/// Remove generated files older than `max_age`. Returns how many went away.
pub fn clean_old_generated(dir: &Path, max_age: Duration) -> usize {
    if !dir.exists() {
        return 0;
    }

    let cutoff = SystemTime::now()
        .checked_sub(max_age)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0;

    for entry in WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy();
        if !GENERATED_PREFIXES.iter().any(|p| name.starts_with(p)) {
            continue;
        }

        let modified = match entry.metadata().ok().and_then(|m| m.modified().ok()) {
            Some(t) => t,
            None => continue,
        };

        if modified < cutoff {
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    info!("[MEDIA] Cleaned up old file: {}", name);
                    removed += 1;
                }
                Err(e) => warn!("[MEDIA] Could not remove {}: {}", name, e),
            }
        }
    }

    removed
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub filename: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub extension: Option<String>,
}

pub fn file_info(path: &Path) -> Option<FileInfo> {
    let meta = fs::metadata(path).ok()?;
    if !meta.is_file() {
        return None;
    }
    Some(FileInfo {
        filename: path.file_name()?.to_string_lossy().into_owned(),
        size_bytes: meta.len(),
        modified_at: meta.modified().ok()?.into(),
        extension: path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase()),
    })
}
