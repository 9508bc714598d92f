// PromptReel Storage
// Copyright (c) 2026 Xing_The_Creator | PromptReel

pub mod models;
pub mod repository;

pub use models::{GeneratedImage, GeneratedVideo, Page};
pub use repository::Database;
