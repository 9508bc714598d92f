// PromptReel Procedural Painter
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Offline stand-in for the hosted models: reads colors, objects and a style
// word out of the prompt and paints a flat illustration from them.

use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_ellipse_mut, draw_filled_rect_mut, draw_line_segment_mut,
    draw_polygon_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use rand::Rng;
use serde::Serialize;

use crate::error::{GenError, GenResult};
use crate::prompt::{tokenize, word_matches};

pub const DEFAULT_BACKGROUND: [u8; 3] = [99, 102, 241];

const COLOR_KEYWORDS: &[(&str, [u8; 3])] = &[
    ("red", [220, 20, 20]),
    ("blue", [20, 20, 220]),
    ("green", [20, 220, 20]),
    ("yellow", [220, 220, 20]),
    ("purple", [139, 92, 246]),
    ("orange", [245, 158, 11]),
    ("pink", [236, 72, 153]),
    ("black", [30, 30, 30]),
    ("white", [245, 245, 245]),
    ("gray", [128, 128, 128]),
    ("brown", [139, 69, 19]),
    ("gold", [255, 215, 0]),
    ("silver", [192, 192, 192]),
];

const OBJECT_KEYWORDS: &[(&str, &str)] = &[
    ("cat", "animal"),
    ("dog", "animal"),
    ("tree", "nature"),
    ("flower", "nature"),
    ("house", "building"),
    ("car", "vehicle"),
    ("sun", "celestial"),
    ("moon", "celestial"),
    ("star", "celestial"),
    ("mountain", "landscape"),
    ("ocean", "landscape"),
    ("forest", "landscape"),
    ("city", "urban"),
    ("person", "human"),
    ("bird", "animal"),
    ("fish", "animal"),
];

const STYLE_KEYWORDS: &[&str] = &[
    "abstract",
    "cartoon",
    "realistic",
    "artistic",
    "modern",
    "vintage",
    "minimalist",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneObject {
    pub kind: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneAnalysis {
    pub background: [u8; 3],
    pub objects: Vec<SceneObject>,
    pub style: &'static str,
}

pub fn analyze_prompt(prompt: &str) -> SceneAnalysis {
    let words = tokenize(prompt);
    let has = |kw: &str| words.iter().any(|w| word_matches(w, kw));

    let background = COLOR_KEYWORDS
        .iter()
        .find(|(kw, _)| has(kw))
        .map(|(_, rgb)| *rgb)
        .unwrap_or(DEFAULT_BACKGROUND);

    let objects = OBJECT_KEYWORDS
        .iter()
        .filter(|(kw, _)| has(kw))
        .map(|&(kind, category)| SceneObject { kind, category })
        .collect();

    let style = STYLE_KEYWORDS
        .iter()
        .copied()
        .find(|kw| has(kw))
        .unwrap_or("realistic");

    SceneAnalysis {
        background,
        objects,
        style,
    }
}

pub fn paint<R: Rng + ?Sized>(
    analysis: &SceneAnalysis,
    width: u32,
    height: u32,
    rng: &mut R,
) -> GenResult<RgbImage> {
    if width == 0 || height == 0 {
        return Err(GenError::validation(format!("cannot paint a {}x{} canvas", width, height)));
    }
    let mut img = RgbImage::new(width, height);
    gradient(&mut img, analysis.background);

    for obj in &analysis.objects {
        match obj.kind {
            "cat" => draw_cat(&mut img),
            "dog" => draw_dog(&mut img),
            "tree" => draw_tree(&mut img),
            "sun" => draw_sun(&mut img),
            "house" => draw_house(&mut img),
            "mountain" => draw_mountain(&mut img),
            _ => draw_generic(&mut img),
        }
    }

    sparkles(&mut img, rng);
    Ok(img)
}

/// Vertical gradient darkening to 70% of the base color at the bottom.
fn gradient(img: &mut RgbImage, base: [u8; 3]) {
    let h = img.height().max(1) as f32;
    for (_, y, px) in img.enumerate_pixels_mut() {
        let k = 1.0 - (y as f32 / h) * 0.3;
        *px = Rgb(base.map(|c| (c as f32 * k) as u8));
    }
}

fn center(img: &RgbImage) -> (i32, i32) {
    (img.width() as i32 / 2, img.height() as i32 / 2)
}

fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Rect {
    Rect::at(x0, y0).of_size((x1 - x0).max(1) as u32, (y1 - y0).max(1) as u32)
}

fn triangle(img: &mut RgbImage, pts: [(i32, i32); 3], color: [u8; 3]) {
    let poly: Vec<Point<i32>> = pts.iter().map(|(x, y)| Point::new(*x, *y)).collect();
    draw_polygon_mut(img, &poly, Rgb(color));
}

fn draw_cat(img: &mut RgbImage) {
    let (cx, cy) = center(img);
    draw_filled_ellipse_mut(img, (cx, cy + 20), 60, 40, Rgb([80, 80, 80]));
    draw_filled_circle_mut(img, (cx, cy - 30), 50, Rgb([90, 90, 90]));
    triangle(img, [(cx - 30, cy - 60), (cx - 55, cy - 80), (cx - 18, cy - 75)], [100, 100, 100]);
    triangle(img, [(cx + 30, cy - 60), (cx + 55, cy - 80), (cx + 18, cy - 75)], [100, 100, 100]);
    draw_filled_circle_mut(img, (cx - 20, cy - 45), 5, Rgb([0, 255, 0]));
    draw_filled_circle_mut(img, (cx + 20, cy - 45), 5, Rgb([0, 255, 0]));
    triangle(img, [(cx, cy - 35), (cx - 5, cy - 25), (cx + 5, cy - 25)], [255, 192, 203]);
    // Tail: lower half-arc, drawn as short segments.
    let (tx, ty, r) = ((cx + 75) as f32, (cy + 15) as f32, 25.0f32);
    for i in 0..12 {
        let a0 = std::f32::consts::PI * i as f32 / 12.0;
        let a1 = std::f32::consts::PI * (i + 1) as f32 / 12.0;
        for w in -3..=3 {
            let rr = r + w as f32;
            draw_line_segment_mut(
                img,
                (tx + rr * a0.cos(), ty + rr * a0.sin()),
                (tx + rr * a1.cos(), ty + rr * a1.sin()),
                Rgb([80, 80, 80]),
            );
        }
    }
}

fn draw_dog(img: &mut RgbImage) {
    let (cx, cy) = center(img);
    draw_filled_ellipse_mut(img, (cx, cy + 40), 60, 40, Rgb([139, 69, 19]));
    draw_filled_circle_mut(img, (cx, cy - 20), 40, Rgb([160, 82, 45]));
    draw_filled_circle_mut(img, (cx - 35, cy - 25), 15, Rgb([101, 67, 33]));
    draw_filled_circle_mut(img, (cx + 35, cy - 25), 15, Rgb([101, 67, 33]));
    draw_filled_circle_mut(img, (cx - 15, cy - 25), 5, Rgb([0, 0, 0]));
    draw_filled_circle_mut(img, (cx + 15, cy - 25), 5, Rgb([0, 0, 0]));
    draw_filled_circle_mut(img, (cx, cy - 5), 5, Rgb([0, 0, 0]));
}

fn draw_tree(img: &mut RgbImage) {
    let cx = img.width() as i32 / 2;
    let ground = img.height() as i32 - 50;
    let trunk_h = 100;
    draw_filled_rect_mut(img, rect(cx - 10, ground - trunk_h, cx + 10, ground), Rgb([101, 67, 33]));
    for (i, color) in [[34, 139, 34], [50, 205, 50], [0, 128, 0]].into_iter().enumerate() {
        let radius = 50 - i as i32 * 10;
        draw_filled_circle_mut(img, (cx, ground - trunk_h + i as i32 * 15), radius, Rgb(color));
    }
}

fn draw_sun(img: &mut RgbImage) {
    let (sx, sy) = (img.width() as f32 - 100.0, 100.0f32);
    let radius = 40.0f32;
    for step in 0..8 {
        let a = (step as f32 * 45.0).to_radians();
        let (c, s) = (a.cos(), a.sin());
        for w in -1..=1 {
            let off = w as f32;
            draw_line_segment_mut(
                img,
                (sx + (radius + 5.0) * c + off, sy + (radius + 5.0) * s),
                (sx + (radius + 20.0) * c + off, sy + (radius + 20.0) * s),
                Rgb([255, 255, 0]),
            );
        }
    }
    draw_filled_circle_mut(img, (sx as i32, sy as i32), radius as i32, Rgb([255, 215, 0]));
}

fn draw_house(img: &mut RgbImage) {
    let cx = img.width() as i32 / 2;
    let ground = img.height() as i32 - 80;
    let (hw, hh) = (120, 80);
    draw_filled_rect_mut(img, rect(cx - hw / 2, ground - hh, cx + hw / 2, ground), Rgb([139, 69, 19]));
    triangle(
        img,
        [(cx - hw / 2 - 10, ground - hh), (cx, ground - hh - 40), (cx + hw / 2 + 10, ground - hh)],
        [178, 34, 34],
    );
    draw_filled_rect_mut(img, rect(cx - 12, ground - 50, cx + 12, ground), Rgb([101, 67, 33]));
    draw_filled_rect_mut(img, rect(cx - 40, ground - 60, cx - 20, ground - 40), Rgb([135, 206, 235]));
    draw_filled_rect_mut(img, rect(cx + 20, ground - 60, cx + 40, ground - 40), Rgb([135, 206, 235]));
}

fn draw_mountain(img: &mut RgbImage) {
    let w = img.width() as i32;
    let ground = img.height() as i32 - 50;
    let peaks = [
        (w / 4, 150, 100, [105, 105, 105]),
        (w / 2, 200, 120, [128, 128, 128]),
        (3 * w / 4, 180, 110, [119, 136, 153]),
    ];
    for (px, ph, pw, color) in peaks {
        triangle(img, [(px - pw / 2, ground), (px, ground - ph), (px + pw / 2, ground)], color);
    }
}

fn draw_generic(img: &mut RgbImage) {
    let (cx, cy) = center(img);
    draw_filled_circle_mut(img, (cx, cy), 40, Rgb([139, 92, 246]));
    draw_filled_rect_mut(img, rect(cx - 20, cy - 60, cx + 20, cy + 60), Rgb([99, 102, 241]));
}

/// Eight white dots scattered across the upper third.
fn sparkles<R: Rng + ?Sized>(img: &mut RgbImage, rng: &mut R) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    if w <= 40 || h / 3 <= 20 {
        return;
    }
    for _ in 0..8 {
        let x = rng.gen_range(20..w - 20);
        let y = rng.gen_range(20..=h / 3);
        let size = rng.gen_range(2..=5);
        draw_filled_circle_mut(img, (x, y), size, Rgb([255, 255, 255]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn first_color_keyword_wins() {
        assert_eq!(analyze_prompt("a red and blue kite").background, [220, 20, 20]);
        assert_eq!(analyze_prompt("a kite").background, DEFAULT_BACKGROUND);
        // "bored" is not "red".
        assert_eq!(analyze_prompt("a bored kite").background, DEFAULT_BACKGROUND);
    }

    #[test]
    fn objects_and_style_are_detected() {
        let a = analyze_prompt("Cartoon cats under the sun near a house");
        let kinds: Vec<_> = a.objects.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, vec!["cat", "house", "sun"]);
        assert_eq!(a.objects[0].category, "animal");
        assert_eq!(a.style, "cartoon");
        assert_eq!(analyze_prompt("plain").style, "realistic");
    }

    #[test]
    fn gradient_darkens_downwards() {
        let analysis = analyze_prompt("white");
        let img = paint(&analysis, 64, 64, &mut StdRng::seed_from_u64(1)).unwrap();
        // Bottom-left corner is far from every sparkle and shape.
        let bottom = img.get_pixel(0, 63).0[0];
        assert!(bottom < 245 && bottom as f32 >= 245.0 * 0.7 - 1.0);
    }

    #[test]
    fn paints_every_known_object_without_panicking() {
        let analysis = analyze_prompt("cat dog tree sun house mountain ocean");
        let img = paint(&analysis, 512, 512, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(img.dimensions(), (512, 512));
        // Small canvases clip shapes instead of failing.
        let small = paint(&analysis, 16, 16, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(small.dimensions(), (16, 16));
        assert!(paint(&analysis, 0, 16, &mut StdRng::seed_from_u64(9)).is_err());
    }
}
