// PromptReel Configuration
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Settings come from the environment (a `.env` file is loaded by main).
// Every variable is optional and prefixed with `PROMPTREEL_`.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{GenError, GenResult};
use crate::media::MediaDirs;
use crate::video::interpolate::Ease;
use crate::video::pipeline::VideoSettings;

/// Which hosted image APIs to try, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Pollinations,
    HuggingFace,
}

impl FromStr for ProviderKind {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pollinations" => Ok(ProviderKind::Pollinations),
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            other => Err(GenError::config(format!("unknown image provider '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub enabled: Vec<ProviderKind>,
    pub pollinations_url: String,
    pub huggingface_url: String,
    pub huggingface_model: String,
    pub huggingface_token: Option<String>,
    /// Size requested from the hosted APIs.
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: vec![ProviderKind::Pollinations, ProviderKind::HuggingFace],
            pollinations_url: "https://image.pollinations.ai".to_string(),
            huggingface_url: "https://api-inference.huggingface.co".to_string(),
            huggingface_model: "runwayml/stable-diffusion-v1-5".to_string(),
            huggingface_token: None,
            image_width: 512,
            image_height: 512,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub media: MediaDirs,
    pub providers: ProviderConfig,
    /// Stills generated per video.
    pub keyframes: usize,
    pub video: VideoSettings,
    pub font_path: PathBuf,
    /// Fixed seed for reproducible output; random per request when unset.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: "sqlite:promptreel.db".to_string(),
            media: MediaDirs::new("static/images", "static/videos"),
            providers: ProviderConfig::default(),
            keyframes: 10,
            video: VideoSettings::default(),
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
            seed: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> GenResult<Self> {
        let d = Self::default();

        let enabled = match std::env::var("PROMPTREEL_PROVIDERS") {
            Ok(list) if list.trim().is_empty() || list.trim() == "none" => Vec::new(),
            Ok(list) => list
                .split(',')
                .map(ProviderKind::from_str)
                .collect::<GenResult<Vec<_>>>()?,
            Err(_) => d.providers.enabled.clone(),
        };

        let ease = match std::env::var("PROMPTREEL_EASE") {
            Ok(name) => Ease::from_str(&name)?,
            Err(_) => d.video.ease,
        };

        let cfg = Self {
            host: env_or("PROMPTREEL_HOST", d.host)?,
            port: env_or("PROMPTREEL_PORT", d.port)?,
            database_url: env_or("PROMPTREEL_DATABASE_URL", d.database_url)?,
            media: MediaDirs::new(
                env_or("PROMPTREEL_IMAGES_DIR", d.media.images)?,
                env_or("PROMPTREEL_VIDEOS_DIR", d.media.videos)?,
            ),
            providers: ProviderConfig {
                enabled,
                pollinations_url: env_or("PROMPTREEL_POLLINATIONS_URL", d.providers.pollinations_url)?,
                huggingface_url: env_or("PROMPTREEL_HF_URL", d.providers.huggingface_url)?,
                huggingface_model: env_or("PROMPTREEL_HF_MODEL", d.providers.huggingface_model)?,
                huggingface_token: std::env::var("PROMPTREEL_HF_TOKEN")
                    .ok()
                    .filter(|t| !t.is_empty()),
                image_width: env_or("PROMPTREEL_IMAGE_WIDTH", d.providers.image_width)?,
                image_height: env_or("PROMPTREEL_IMAGE_HEIGHT", d.providers.image_height)?,
            },
            keyframes: env_or("PROMPTREEL_KEYFRAMES", d.keyframes)?,
            video: VideoSettings {
                width: env_or("PROMPTREEL_VIDEO_WIDTH", d.video.width)?,
                height: env_or("PROMPTREEL_VIDEO_HEIGHT", d.video.height)?,
                fps: env_or("PROMPTREEL_VIDEO_FPS", d.video.fps)?,
                duration_secs: env_or("PROMPTREEL_VIDEO_SECONDS", d.video.duration_secs)?,
                ease,
                audio: env_or("PROMPTREEL_AUDIO", d.video.audio)?,
            },
            font_path: env_or("PROMPTREEL_FONT", d.font_path)?,
            seed: match std::env::var("PROMPTREEL_SEED") {
                Ok(s) => Some(parse_var("PROMPTREEL_SEED", &s)?),
                Err(_) => None,
            },
        };

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> GenResult<()> {
        if self.keyframes == 0 {
            return Err(GenError::config("keyframe count must be at least 1"));
        }
        if self.providers.image_width == 0 || self.providers.image_height == 0 {
            return Err(GenError::config("image width and height must be non-zero"));
        }
        self.video.validate()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> GenResult<T> {
    match std::env::var(key) {
        Ok(raw) => parse_var(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> GenResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| GenError::config(format!("invalid value '{}' for {}", raw, key)))
}
