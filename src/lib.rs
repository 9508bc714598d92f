// PromptReel Library Root
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Prompt -> AI keyframes -> animated, captioned MP4 with a generated
// soundtrack, plus the SQLite catalog and web front end around it.

pub mod config;
pub mod error;
pub mod generator;
pub mod health;
pub mod media;
pub mod prompt;
pub mod server;
pub mod service;
pub mod state;
pub mod storage;
pub mod video;
pub mod views;

pub use config::AppConfig;
pub use error::{ApiError, GenError, GenResult};
pub use state::{AppState, StudioState};
