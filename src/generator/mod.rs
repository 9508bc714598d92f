// PromptReel Image Generation
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Keyframe acquisition with a fallback chain:
// hosted providers -> procedural painter -> placeholder card.

pub mod local;
pub mod placeholder;
pub mod providers;

use image::{ImageFormat, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::ProviderConfig;
use crate::error::{GenError, GenResult};
use crate::media::generate_filename;
use crate::video::hooks::SharedFont;
pub use providers::{build_providers, HuggingFaceProvider, ImageProvider, PollinationsProvider};

/// Where a keyframe came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "provider", rename_all = "snake_case")]
pub enum ImageSource {
    Remote(String),
    Local,
    Placeholder,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Remote(name) => write!(f, "remote:{}", name),
            ImageSource::Local => f.write_str("local"),
            ImageSource::Placeholder => f.write_str("placeholder"),
        }
    }
}

/// One still, decoded and already saved under the images directory.
#[derive(Debug, Clone)]
pub struct Keyframe {
    pub image: RgbImage,
    pub filename: String,
    pub source: ImageSource,
}

pub struct ImageGenerator {
    providers: Vec<Box<dyn ImageProvider>>,
    images_dir: PathBuf,
    width: u32,
    height: u32,
    font: Option<SharedFont>,
}

impl ImageGenerator {
    pub fn new(cfg: &ProviderConfig, images_dir: impl Into<PathBuf>, font: Option<SharedFont>) -> Self {
        Self::with_providers(
            build_providers(cfg),
            images_dir,
            cfg.image_width,
            cfg.image_height,
            font,
        )
    }

    pub fn with_providers(
        providers: Vec<Box<dyn ImageProvider>>,
        images_dir: impl Into<PathBuf>,
        width: u32,
        height: u32,
        font: Option<SharedFont>,
    ) -> Self {
        Self {
            providers,
            images_dir: images_dir.into(),
            width,
            height,
            font,
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// `count` keyframes seeded `base_seed`, `base_seed + 1`, ...
    ///
    /// Remote failures never surface; only local disk errors do.
    pub async fn generate_keyframes(&self, prompt: &str, count: usize, base_seed: u64) -> GenResult<Vec<Keyframe>> {
        let started = Instant::now();
        let mut frames = Vec::with_capacity(count);
        for i in 0..count {
            let seed = base_seed.wrapping_add(i as u64);
            let frame = self.generate_one(prompt, seed).await?;
            info!(
                "[GEN] Keyframe {}/{} from {} -> {}",
                i + 1,
                count,
                frame.source,
                frame.filename
            );
            frames.push(frame);
        }
        info!(
            "[GEN] {} keyframes ready in {:.1}s",
            frames.len(),
            started.elapsed().as_secs_f32()
        );
        Ok(frames)
    }

    pub async fn generate_single(&self, prompt: &str, seed: u64) -> GenResult<Keyframe> {
        self.generate_one(prompt, seed).await
    }

    async fn generate_one(&self, prompt: &str, seed: u64) -> GenResult<Keyframe> {
        for provider in &self.providers {
            match self.try_provider(provider.as_ref(), prompt, seed).await {
                Ok(frame) => return Ok(frame),
                Err(e) => warn!("[GEN] {} failed: {}", provider.name(), e),
            }
        }
        self.generate_offline(prompt, seed)
    }

    async fn try_provider(&self, provider: &dyn ImageProvider, prompt: &str, seed: u64) -> GenResult<Keyframe> {
        let bytes = provider.generate(prompt, seed).await?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| GenError::provider(format!("{} sent undecodable bytes: {}", provider.name(), e)))?;

        // Keep the provider's own encoding when it is one we serve as-is.
        let filename = match image::guess_format(&bytes) {
            Ok(ImageFormat::Jpeg) => Some(generate_filename("generated", "jpg")),
            Ok(ImageFormat::Png) => Some(generate_filename("generated", "png")),
            _ => None,
        };
        let image = decoded.to_rgb8();
        let filename = match filename {
            Some(name) => {
                tokio::fs::create_dir_all(&self.images_dir).await?;
                tokio::fs::write(self.images_dir.join(&name), &bytes).await?;
                name
            }
            None => self.save_png(&image)?,
        };

        Ok(Keyframe {
            image,
            filename,
            source: ImageSource::Remote(provider.name().to_string()),
        })
    }

    /// Procedural painter, then placeholder card, then a plain fill.
    pub fn generate_offline(&self, prompt: &str, seed: u64) -> GenResult<Keyframe> {
        let analysis = local::analyze_prompt(prompt);
        let mut rng = StdRng::seed_from_u64(seed);
        let (image, source) = match local::paint(&analysis, self.width, self.height, &mut rng) {
            Ok(img) => (img, ImageSource::Local),
            Err(e) => {
                error!("[GEN] Local painter failed ({}); using placeholder card", e);
                let card = placeholder::placeholder_card(prompt, self.width, self.height, self.font.as_deref())
                    .unwrap_or_else(|e| {
                        error!("[GEN] Placeholder card failed: {}", e);
                        placeholder::solid_card(self.width, self.height)
                    });
                (card, ImageSource::Placeholder)
            }
        };

        let filename = self.save_png(&image)?;
        Ok(Keyframe {
            image,
            filename,
            source,
        })
    }

    fn save_png(&self, image: &RgbImage) -> GenResult<String> {
        std::fs::create_dir_all(&self.images_dir)?;
        let name = generate_filename("generated", "png");
        image.save_with_format(self.images_dir.join(&name), ImageFormat::Png)?;
        Ok(name)
    }
}
