// PromptReel Hook Overlays
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Time-windowed text: an attention hook over the opening 30% of the video
// and a call to action over the final 20%.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use rand::seq::SliceRandom;
use rand::Rng;
use rusttype::{Font, Scale};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::prompt::ContentBucket;

pub const CALL_TO_ACTION: &str = "Follow for more AI magic!";

const HOOK_SIZE: f32 = 40.0;
const CTA_SIZE: f32 = 30.0;
const TEXT_X: i32 = 50;
const SHADOW_OFFSET: i32 = 2;
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const SHADOW_COLOR: Rgb<u8> = Rgb([16, 16, 16]);

pub type SharedFont = Arc<Font<'static>>;

/// Load a TrueType font, or `None` with a warning when unavailable.
pub fn load_font(path: &Path) -> Option<SharedFont> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!("[HOOKS] Font {:?} unavailable ({}); text overlays disabled", path, e);
            return None;
        }
    };
    match Font::try_from_vec(bytes) {
        Some(font) => {
            info!("[HOOKS] Loaded font {:?}", path);
            Some(Arc::new(font))
        }
        None => {
            warn!("[HOOKS] {:?} is not a usable font; text overlays disabled", path);
            None
        }
    }
}

pub fn hook_table(bucket: ContentBucket) -> &'static [&'static str; 3] {
    match bucket {
        ContentBucket::Animal => &[
            "This is too cute!",
            "Watch this amazing animal!",
            "You won't believe this!",
        ],
        ContentBucket::Scenic => &[
            "This is breathtaking!",
            "Watch this incredible view!",
            "Amazing transformation!",
        ],
        ContentBucket::Action => &[
            "Watch this incredible move!",
            "This is insane!",
            "Speed like never before!",
        ],
        ContentBucket::Dance => &[
            "Wait for the drop!",
            "These moves are unreal!",
            "Can you dance like this?",
        ],
        ContentBucket::Water => &[
            "Watch the flow!",
            "Pure liquid motion!",
            "So calming...",
        ],
        ContentBucket::Fire => &[
            "Things are heating up!",
            "Don't blink!",
            "Pure fire!",
        ],
        ContentBucket::Winter => &[
            "Winter magic incoming!",
            "Feel the chill!",
            "Snow like never before!",
        ],
        ContentBucket::General => &[
            "This is amazing!",
            "Watch this!",
            "Incredible AI creation!",
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookWindow {
    Hook,
    CallToAction,
    Quiet,
}

impl HookWindow {
    pub fn for_frame(frame_idx: u32, total_frames: u32) -> Self {
        let f = frame_idx as f64;
        let total = total_frames as f64;
        if f < total * 0.3 {
            HookWindow::Hook
        } else if f > total * 0.8 {
            HookWindow::CallToAction
        } else {
            HookWindow::Quiet
        }
    }
}

/// Draws the chosen hook and the call to action on 8-bit frames.
pub struct HookOverlay {
    font: Option<SharedFont>,
    hook: &'static str,
}

impl HookOverlay {
    /// Pick one hook for the whole video so the text does not flicker.
    pub fn new<R: Rng + ?Sized>(bucket: ContentBucket, font: Option<SharedFont>, rng: &mut R) -> Self {
        let hook = hook_table(bucket)
            .choose(rng)
            .copied()
            .unwrap_or(CALL_TO_ACTION);
        Self { font, hook }
    }

    pub fn hook(&self) -> &'static str {
        self.hook
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Text and top-left position for a frame, if any text is due.
    pub fn layout(&self, frame_idx: u32, total_frames: u32, height: u32) -> Option<(&'static str, i32, f32)> {
        match HookWindow::for_frame(frame_idx, total_frames) {
            HookWindow::Hook => {
                let bob = (10.0 * (frame_idx as f64 * 0.2).sin()) as i32;
                Some((self.hook, 50 + bob, HOOK_SIZE))
            }
            HookWindow::CallToAction => Some((CALL_TO_ACTION, height as i32 - 100, CTA_SIZE)),
            HookWindow::Quiet => None,
        }
    }

    pub fn apply(&self, frame: &mut RgbImage, frame_idx: u32, total_frames: u32) {
        let Some(font) = self.font.as_deref() else {
            return;
        };
        let Some((text, y, size)) = self.layout(frame_idx, total_frames, frame.height()) else {
            return;
        };
        let scale = Scale::uniform(size);
        draw_text_mut(
            frame,
            SHADOW_COLOR,
            TEXT_X + SHADOW_OFFSET,
            y + SHADOW_OFFSET,
            scale,
            font,
            text,
        );
        draw_text_mut(frame, TEXT_COLOR, TEXT_X, y, scale, font, text);
    }
}
