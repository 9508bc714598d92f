// PromptReel Video Module
// Copyright (c) 2026 Xing_The_Creator | PromptReel

pub mod audio;
pub mod effects;
pub mod encoder;
pub mod hooks;
pub mod interpolate;
pub mod particles;
pub mod pipeline;

pub use encoder::is_ffmpeg_on_path;
pub use hooks::{load_font, SharedFont};
pub use interpolate::Ease;
pub use pipeline::{assemble, AssemblyReport, VideoSettings};
