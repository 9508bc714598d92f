// PromptReel Placeholder Card
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Last-resort keyframe: a rasterized SVG card with the prompt printed on it.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use resvg::tiny_skia;
use resvg::usvg;
use rusttype::{Font, Scale};
use tracing::warn;

use crate::error::{GenError, GenResult};
use crate::generator::local::DEFAULT_BACKGROUND;

const PROMPT_PREVIEW_CHARS: usize = 30;

fn card_svg(width: u32, height: u32) -> String {
    let (w, h) = (width as f32, height as f32);
    let r = w.min(h) * 0.25;
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
  <defs>
    <linearGradient id="bg" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0" stop-color="#6366f1"/>
      <stop offset="1" stop-color="#8b5cf6"/>
    </linearGradient>
  </defs>
  <rect width="{width}" height="{height}" fill="url(#bg)"/>
  <circle cx="{cx}" cy="{cy}" r="{r}" fill="#ffffff" fill-opacity="0.1"/>
  <rect x="{rx}" y="{ry}" width="{rw}" height="{rh}" rx="20" fill="#ffffff" fill-opacity="0.2"/>
</svg>"##,
        cx = w / 2.0,
        cy = h / 2.0,
        rx = w * 0.1,
        ry = h * 0.7,
        rw = w * 0.8,
        rh = h * 0.2,
    )
}

/// "AI Generated" card, with the prompt preview printed when a font is given.
pub fn placeholder_card(prompt: &str, width: u32, height: u32, font: Option<&Font<'static>>) -> GenResult<RgbImage> {
    let svg = card_svg(width, height);
    let tree = usvg::Tree::from_data(svg.as_bytes(), &usvg::Options::default())
        .map_err(|e| GenError::Other(anyhow::anyhow!("placeholder svg: {e}")))?;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| GenError::validation(format!("invalid card size {}x{}", width, height)))?;
    resvg::render(
        &tree,
        usvg::FitTo::Original,
        tiny_skia::Transform::default(),
        pixmap.as_mut(),
    )
    .ok_or_else(|| GenError::Other(anyhow::anyhow!("placeholder svg did not render")))?;

    let mut img = RgbImage::new(width, height);
    for (dst, src) in img.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
        *dst = Rgb([src[0], src[1], src[2]]);
    }

    match font {
        Some(font) => {
            let white = Rgb([255, 255, 255]);
            let x = (width / 10) as i32 + 16;
            let y = (height as f32 * 0.72) as i32;
            draw_text_mut(&mut img, white, x, y, Scale::uniform(28.0), font, "AI Generated");
            draw_text_mut(&mut img, white, x, y + 36, Scale::uniform(20.0), font, &preview(prompt));
        }
        None => warn!("[GEN] No font for placeholder text; card left blank"),
    }
    Ok(img)
}

/// Plain background fill, for when even the SVG card cannot be produced.
pub fn solid_card(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(DEFAULT_BACKGROUND))
}

fn preview(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(PROMPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_prompts() {
        assert_eq!(preview("short"), "short");
        let long = "a".repeat(45);
        assert_eq!(preview(&long), format!("{}...", "a".repeat(30)));
        assert_eq!(preview(&"é".repeat(30)), "é".repeat(30));
    }

    #[test]
    fn card_has_gradient_corners() {
        let card = placeholder_card("a quiet lake", 128, 128, None).unwrap();
        assert_eq!(card.dimensions(), (128, 128));
        let top_left = card.get_pixel(0, 0).0;
        let bottom_right = card.get_pixel(127, 127).0;
        // Indigo start, violet end.
        assert!(top_left[2] > 200 && top_left[0] < 120);
        assert!(bottom_right[0] > top_left[0]);
    }

    #[test]
    fn zero_size_card_is_an_error() {
        assert!(placeholder_card("x", 0, 10, None).is_err());
    }

    #[test]
    fn solid_card_uses_default_background() {
        assert_eq!(solid_card(2, 2).get_pixel(1, 1).0, DEFAULT_BACKGROUND);
    }
}
