// PromptReel Shared State
// Copyright (c) 2026 Xing_The_Creator | PromptReel

use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::error::GenResult;
use crate::generator::ImageGenerator;
use crate::storage::Database;
use crate::video::hooks::{load_font, SharedFont};

/// Everything a request needs: settings, the catalog and the image chain.
pub struct StudioState {
    pub config: AppConfig,
    pub db: Database,
    pub generator: ImageGenerator,
    pub font: Option<SharedFont>,
}

pub type AppState = Arc<StudioState>;

impl StudioState {
    /// Check the config, prepare media directories, open the database and
    /// load the overlay font.
    pub async fn init(config: AppConfig) -> GenResult<Self> {
        config.validate()?;
        config.media.ensure()?;
        let db = Database::connect(&config.database_url).await?;
        let font = load_font(&config.font_path);
        Ok(Self::with_parts(config, db, font))
    }

    pub fn with_parts(config: AppConfig, db: Database, font: Option<SharedFont>) -> Self {
        let generator = ImageGenerator::new(&config.providers, config.media.images.clone(), font.clone());
        info!(
            "[SERVER] Studio ready: {} provider(s), {} keyframes/video, {}x{} @ {}fps",
            config.providers.enabled.len(),
            config.keyframes,
            config.video.width,
            config.video.height,
            config.video.fps
        );
        Self {
            config,
            db,
            generator,
            font,
        }
    }

    pub fn with_generator(mut self, generator: ImageGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Configured seed, or a fresh random one.
    pub fn next_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }
}
