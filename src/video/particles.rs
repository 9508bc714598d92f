// PromptReel Particle Overlays
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Cheap additive particle systems. Positions are re-rolled each frame and
// shifted by the frame index so the field appears to drift.

use image::Rgb32FImage;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Water,
    Fire,
    Snow,
    Sparkle,
    Confetti,
}

const CONFETTI_COLORS: [[f32; 3]; 5] = [
    [1.0, 0.25, 0.45],
    [0.25, 0.85, 1.0],
    [1.0, 0.85, 0.2],
    [0.55, 1.0, 0.35],
    [0.8, 0.4, 1.0],
];

pub fn apply<R: Rng + ?Sized>(kind: ParticleKind, frame: &mut Rgb32FImage, frame_idx: u32, rng: &mut R) {
    match kind {
        ParticleKind::Water => water(frame, frame_idx, rng),
        ParticleKind::Fire => fire(frame, frame_idx, rng),
        ParticleKind::Snow => snow(frame, frame_idx, rng),
        ParticleKind::Sparkle => sparkle(frame, frame_idx, rng),
        ParticleKind::Confetti => confetti(frame, frame_idx, rng),
    }
}

/// Falling droplets with a blue tint.
pub fn water<R: Rng + ?Sized>(frame: &mut Rgb32FImage, frame_idx: u32, rng: &mut R) {
    let (w, h) = frame.dimensions();
    for _ in 0..rng.gen_range(5..=15) {
        let x = rng.gen_range(0..w);
        let y = (rng.gen_range(0..h) + frame_idx * 2) % h;
        let r = rng.gen_range(1..=3);
        let intensity = rng.gen_range(0.1..0.3);
        add_square(frame, x, y, r, [0.0, 0.0, intensity]);
    }
}

/// Embers rising from the lower half, red with some green for orange.
pub fn fire<R: Rng + ?Sized>(frame: &mut Rgb32FImage, frame_idx: u32, rng: &mut R) {
    let (w, h) = frame.dimensions();
    let half = (h / 2).max(1);
    let rise = (frame_idx * 3) % half;
    for _ in 0..rng.gen_range(8..=20) {
        let x = rng.gen_range(0..w);
        let y = rng.gen_range(h / 2..h).saturating_sub(rise);
        let r = rng.gen_range(1..=4);
        let intensity = rng.gen_range(0.2..0.5);
        add_square(frame, x, y, r, [intensity, intensity * 0.5, 0.0]);
    }
}

pub fn snow<R: Rng + ?Sized>(frame: &mut Rgb32FImage, frame_idx: u32, rng: &mut R) {
    let (w, h) = frame.dimensions();
    for _ in 0..rng.gen_range(10..=25) {
        let x = rng.gen_range(0..w);
        let y = (rng.gen_range(0..h) + frame_idx * 2) % h;
        let r = rng.gen_range(1..=2);
        let intensity = rng.gen_range(0.3..0.6);
        add_square(frame, x, y, r, [intensity; 3]);
    }
}

/// Golden twinkles whose brightness pulses with frame and position.
pub fn sparkle<R: Rng + ?Sized>(frame: &mut Rgb32FImage, frame_idx: u32, rng: &mut R) {
    let (w, h) = frame.dimensions();
    for _ in 0..rng.gen_range(3..=8) {
        let x = rng.gen_range(0..w);
        let y = rng.gen_range(0..h);
        let twinkle = (frame_idx as f32 * 0.2 + x as f32 * 0.01 + y as f32 * 0.01)
            .sin()
            .abs();
        let r = rng.gen_range(1..=3);
        let intensity = twinkle * rng.gen_range(0.2..0.4);
        add_square(frame, x, y, r, [intensity, intensity, 0.0]);
    }
}

/// Opaque-ish colored squares swaying on the way down.
pub fn confetti<R: Rng + ?Sized>(frame: &mut Rgb32FImage, frame_idx: u32, rng: &mut R) {
    let (w, h) = frame.dimensions();
    for _ in 0..rng.gen_range(12..=30) {
        let base_x = rng.gen_range(0..w) as f32;
        let sway = (frame_idx as f32 * 0.3 + base_x * 0.05).sin() * 6.0;
        let x = (base_x + sway).clamp(0.0, (w - 1) as f32) as u32;
        let y = (rng.gen_range(0..h) + frame_idx * 4) % h;
        let r = rng.gen_range(2..=4);
        let color = CONFETTI_COLORS[rng.gen_range(0..CONFETTI_COLORS.len())];
        let alpha = rng.gen_range(0.6..0.9);
        mix_square(frame, x, y, r, color, alpha);
    }
}

// Squares that would cross the frame edge are dropped, not clipped.
fn square_bounds(frame: &Rgb32FImage, x: u32, y: u32, r: u32) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = frame.dimensions();
    if x < r || y < r || x + r >= w || y + r >= h {
        return None;
    }
    Some((x - r, y - r, x + r, y + r))
}

fn add_square(frame: &mut Rgb32FImage, x: u32, y: u32, r: u32, add: [f32; 3]) {
    let Some((x0, y0, x1, y1)) = square_bounds(frame, x, y, r) else {
        return;
    };
    for py in y0..y1 {
        for px in x0..x1 {
            let p = frame.get_pixel_mut(px, py);
            for c in 0..3 {
                p[c] += add[c];
            }
        }
    }
}

fn mix_square(frame: &mut Rgb32FImage, x: u32, y: u32, r: u32, color: [f32; 3], alpha: f32) {
    let Some((x0, y0, x1, y1)) = square_bounds(frame, x, y, r) else {
        return;
    };
    for py in y0..y1 {
        for px in x0..x1 {
            let p = frame.get_pixel_mut(px, py);
            for c in 0..3 {
                p[c] = p[c] * (1.0 - alpha) + color[c] * alpha;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sum(frame: &Rgb32FImage) -> f32 {
        frame.iter().sum()
    }

    #[test]
    fn additive_particles_only_brighten() {
        for kind in [ParticleKind::Water, ParticleKind::Fire, ParticleKind::Snow] {
            let mut rng = StdRng::seed_from_u64(7);
            let mut frame = Rgb32FImage::new(64, 64);
            apply(kind, &mut frame, 3, &mut rng);
            assert!(sum(&frame) > 0.0, "{:?} left the frame untouched", kind);
            assert!(frame.iter().all(|v| *v >= 0.0));
        }
    }

    #[test]
    fn water_only_touches_blue() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut frame = Rgb32FImage::new(64, 64);
        water(&mut frame, 0, &mut rng);
        assert!(frame.pixels().all(|p| p[0] == 0.0 && p[1] == 0.0));
    }

    #[test]
    fn edge_particles_are_skipped() {
        let mut frame = Rgb32FImage::new(8, 8);
        add_square(&mut frame, 0, 4, 2, [1.0; 3]);
        add_square(&mut frame, 4, 7, 1, [1.0; 3]);
        assert_eq!(sum(&frame), 0.0);
        add_square(&mut frame, 4, 4, 1, [1.0; 3]);
        // Half-open [x-r, x+r) square: 2x2 pixels, 3 channels.
        assert_eq!(sum(&frame), 12.0);
    }

    #[test]
    fn same_seed_same_field() {
        let mut a = Rgb32FImage::new(32, 32);
        let mut b = Rgb32FImage::new(32, 32);
        confetti(&mut a, 5, &mut StdRng::seed_from_u64(99));
        confetti(&mut b, 5, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_frames_do_not_panic() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut frame = Rgb32FImage::new(1, 1);
        for kind in [
            ParticleKind::Water,
            ParticleKind::Fire,
            ParticleKind::Snow,
            ParticleKind::Sparkle,
            ParticleKind::Confetti,
        ] {
            apply(kind, &mut frame, 10, &mut rng);
        }
    }
}
