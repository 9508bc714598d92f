// PromptReel Visual Effects
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Per-frame filters on float RGB frames in [0, 1], and the per-bucket plan
// that fixes which filters run and in what order.

use image::Rgb32FImage;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::prompt::{ContentBucket, ContentProfile};
use crate::video::interpolate::blend_into;
use crate::video::particles::{self, ParticleKind};

/// Position of the frame being processed.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub index: u32,
    pub total: u32,
}

impl FrameContext {
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.index as f32 / self.total as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorGrade {
    pub contrast: f32,
    pub brightness: f32,
    pub saturation: f32,
    /// Per-channel RGB multiplier applied last.
    pub tint: [f32; 3],
}

impl Default for ColorGrade {
    fn default() -> Self {
        Self {
            contrast: 1.1,
            brightness: 0.05,
            saturation: 1.0,
            tint: [1.0, 1.0, 1.0],
        }
    }
}

impl ColorGrade {
    pub fn for_bucket(bucket: ContentBucket) -> Self {
        let (contrast, brightness, saturation, tint) = match bucket {
            ContentBucket::Dance => (1.15, 0.04, 1.25, [1.04, 0.97, 1.05]),
            ContentBucket::Action => (1.2, 0.02, 1.1, [1.04, 1.0, 0.94]),
            ContentBucket::Fire => (1.12, 0.04, 1.15, [1.08, 1.0, 0.9]),
            ContentBucket::Water => (1.08, 0.05, 1.1, [0.95, 1.0, 1.08]),
            ContentBucket::Winter => (1.05, 0.07, 0.85, [0.94, 0.99, 1.1]),
            ContentBucket::Animal => (1.1, 0.05, 1.1, [1.02, 1.0, 0.98]),
            ContentBucket::Scenic => (1.1, 0.05, 1.2, [1.03, 1.0, 0.97]),
            ContentBucket::General => return Self::default(),
        };
        Self {
            contrast,
            brightness,
            saturation,
            tint,
        }
    }

    fn grade_pixel(&self, px: &mut [f32]) {
        for v in px.iter_mut() {
            *v = *v * self.contrast + self.brightness;
        }
        if self.saturation != 1.0 {
            let luma = 0.299 * px[0] + 0.587 * px[1] + 0.114 * px[2];
            for v in px.iter_mut() {
                *v = luma + (*v - luma) * self.saturation;
            }
        }
        for (v, t) in px.iter_mut().zip(self.tint) {
            *v = (*v * t).clamp(0.0, 1.0);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    GoldenHour,
    Particles { particles: ParticleKind },
    LightRays { intensity: f32 },
    ColorGrade { grade: ColorGrade },
    Vignette { strength: f32 },
    FilmGrain { sigma: f32 },
    /// Box soften after the first frame, plus a trail toward the previous
    /// output frame when `trail > 0`.
    MotionBlur { trail: f32 },
}

/// Ordered, bucket-specific filter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectPlan {
    pub effects: Vec<Effect>,
}

impl EffectPlan {
    pub fn for_profile(profile: &ContentProfile) -> Self {
        let bucket = profile.bucket;
        let mut effects = Vec::with_capacity(7);

        if profile.golden_hour {
            effects.push(Effect::GoldenHour);
        }

        let particles = match bucket {
            ContentBucket::Water => ParticleKind::Water,
            ContentBucket::Fire => ParticleKind::Fire,
            ContentBucket::Winter => ParticleKind::Snow,
            ContentBucket::Dance => ParticleKind::Confetti,
            _ => ParticleKind::Sparkle,
        };
        effects.push(Effect::Particles { particles });

        let rays = match bucket {
            ContentBucket::Scenic => Some(0.12),
            ContentBucket::Water | ContentBucket::Animal => Some(0.08),
            ContentBucket::General if profile.golden_hour => Some(0.1),
            _ => None,
        };
        if let Some(intensity) = rays {
            effects.push(Effect::LightRays { intensity });
        }

        // Grain and vignette go in before the grade so the grade's clip is last.
        effects.push(Effect::FilmGrain { sigma: 0.01 });
        effects.push(Effect::Vignette { strength: 0.3 });
        effects.push(Effect::ColorGrade {
            grade: ColorGrade::for_bucket(bucket),
        });
        effects.push(Effect::MotionBlur {
            trail: if bucket.is_motion_heavy() { 0.35 } else { 0.0 },
        });

        Self { effects }
    }

    /// Run every effect in order. `previous` is the prior output frame.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        frame: &mut Rgb32FImage,
        ctx: FrameContext,
        previous: Option<&Rgb32FImage>,
        rng: &mut R,
    ) {
        for effect in &self.effects {
            match *effect {
                Effect::GoldenHour => golden_hour(frame),
                Effect::Particles { particles } => particles::apply(particles, frame, ctx.index, rng),
                Effect::LightRays { intensity } => light_rays(frame, ctx.index, intensity),
                Effect::ColorGrade { grade } => color_grade(frame, &grade),
                Effect::Vignette { strength } => vignette(frame, strength),
                Effect::FilmGrain { sigma } => film_grain(frame, sigma, rng),
                Effect::MotionBlur { trail } => {
                    if ctx.index > 0 {
                        box_soften(frame);
                        if let Some(prev) = previous.filter(|p| p.dimensions() == frame.dimensions()) {
                            if trail > 0.0 {
                                blend_into(frame, prev, trail);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Warm wash: `frame*0.8 + (0.5, 0.3, 0.1)*0.2`.
pub fn golden_hour(frame: &mut Rgb32FImage) {
    const WARM: [f32; 3] = [0.5, 0.3, 0.1];
    frame.par_chunks_mut(3).for_each(|px| {
        for (v, w) in px.iter_mut().zip(WARM) {
            *v = *v * 0.8 + w * 0.2;
        }
    });
}

/// Soft rays fanning from above the top-right corner, sweeping slowly.
pub fn light_rays(frame: &mut Rgb32FImage, frame_idx: u32, intensity: f32) {
    let (w, h) = frame.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let sx = w as f32 * 1.1;
    let sy = -(h as f32) * 0.15;
    let reach = ((w as f32).powi(2) + (h as f32).powi(2)).sqrt() * 1.2;
    let sweep = frame_idx as f32 * 0.04;
    let row_len = w as usize * 3;

    frame
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = y as f32 - sy;
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                let dx = x as f32 - sx;
                let angle = dy.atan2(dx);
                let ray = ((angle * 14.0 + sweep).sin() * 0.5 + 0.5).powi(6);
                let dist = (dx * dx + dy * dy).sqrt() / reach;
                let falloff = (1.0 - dist).max(0.0).powf(1.5);
                let k = intensity * ray * falloff;
                px[0] += k;
                px[1] += k * 0.9;
                px[2] += k * 0.7;
            }
        });
}

pub fn color_grade(frame: &mut Rgb32FImage, grade: &ColorGrade) {
    frame
        .par_chunks_mut(3)
        .for_each(|px| grade.grade_pixel(px));
}

/// Darken toward the corners: `1 - (d / d_max) * strength`.
pub fn vignette(frame: &mut Rgb32FImage, strength: f32) {
    let (w, h) = frame.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let cx = (w / 2) as f32;
    let cy = (h / 2) as f32;
    let max_d = cx.max(w as f32 - 1.0 - cx).hypot(cy.max(h as f32 - 1.0 - cy)).max(1.0);
    let row_len = w as usize * 3;

    frame
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = y as f32 - cy;
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                let d = (x as f32 - cx).hypot(dy) / max_d;
                let k = 1.0 - d * strength;
                for v in px.iter_mut() {
                    *v *= k;
                }
            }
        });
}

/// Additive gaussian noise. Left unclamped; the grade clips afterwards.
pub fn film_grain<R: Rng + ?Sized>(frame: &mut Rgb32FImage, sigma: f32, rng: &mut R) {
    if sigma <= 0.0 {
        return;
    }
    let mut pending: Option<f32> = None;
    for v in frame.iter_mut() {
        let n = match pending.take() {
            Some(n) => n,
            None => {
                let (a, b) = gaussian_pair(rng);
                pending = Some(b);
                a
            }
        };
        *v += n * sigma;
    }
}

// Box-Muller: two independent standard normals per draw.
fn gaussian_pair<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
    let u2: f32 = rng.gen();
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = std::f32::consts::TAU * u2;
    (r * theta.cos(), r * theta.sin())
}

/// 3x3 box filter with edge clamping.
pub fn box_soften(frame: &mut Rgb32FImage) {
    let (w, h) = frame.dimensions();
    if w < 2 || h < 2 {
        return;
    }
    let src = frame.clone();
    let (w, h) = (w as i64, h as i64);
    let row_len = w as usize * 3;

    frame
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for x in 0..w {
                let mut acc = [0.0f32; 3];
                for dy in -1..=1 {
                    let sy = (y + dy).clamp(0, h - 1) as u32;
                    for dx in -1..=1 {
                        let sx = (x + dx).clamp(0, w - 1) as u32;
                        let p = src.get_pixel(sx, sy);
                        acc[0] += p[0];
                        acc[1] += p[1];
                        acc[2] += p[2];
                    }
                }
                let base = x as usize * 3;
                for c in 0..3 {
                    row[base + c] = acc[c] / 9.0;
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn solid(w: u32, h: u32, v: f32) -> Rgb32FImage {
        Rgb32FImage::from_pixel(w, h, Rgb([v, v, v]))
    }

    #[test]
    fn plan_order_is_fixed() {
        let plan = EffectPlan::for_profile(&ContentProfile::from_prompt("golden waterfall"));
        let kinds: Vec<&str> = plan
            .effects
            .iter()
            .map(|e| match e {
                Effect::GoldenHour => "golden",
                Effect::Particles { .. } => "particles",
                Effect::LightRays { .. } => "rays",
                Effect::ColorGrade { .. } => "grade",
                Effect::Vignette { .. } => "vignette",
                Effect::FilmGrain { .. } => "grain",
                Effect::MotionBlur { .. } => "blur",
            })
            .collect();
        assert_eq!(
            kinds,
            ["golden", "particles", "rays", "grain", "vignette", "grade", "blur"]
        );
        assert_eq!(
            plan.effects[1],
            Effect::Particles {
                particles: ParticleKind::Water
            }
        );
    }

    #[test]
    fn plan_dispatches_by_bucket() {
        let dance = EffectPlan::for_profile(&ContentProfile::from_prompt("kids dancing"));
        assert!(dance.effects.contains(&Effect::Particles {
            particles: ParticleKind::Confetti
        }));
        assert!(dance.effects.contains(&Effect::MotionBlur { trail: 0.35 }));
        assert!(!dance
            .effects
            .iter()
            .any(|e| matches!(e, Effect::LightRays { .. })));

        let plain = EffectPlan::for_profile(&ContentProfile::from_prompt("a teapot"));
        assert!(plain.effects.contains(&Effect::MotionBlur { trail: 0.0 }));
        assert!(plain.effects.contains(&Effect::ColorGrade {
            grade: ColorGrade::default()
        }));
    }

    #[test]
    fn default_grade_matches_lift_and_contrast() {
        let mut f = solid(2, 2, 0.5);
        color_grade(&mut f, &ColorGrade::default());
        assert!((f.get_pixel(0, 0)[0] - 0.6).abs() < 1e-6);

        let mut hot = solid(2, 2, 0.98);
        color_grade(&mut hot, &ColorGrade::default());
        assert_eq!(hot.get_pixel(1, 1)[1], 1.0);
    }

    #[test]
    fn desaturation_pulls_toward_luma() {
        let mut f = Rgb32FImage::from_pixel(1, 1, Rgb([0.8, 0.2, 0.2]));
        let grade = ColorGrade {
            contrast: 1.0,
            brightness: 0.0,
            saturation: 0.0,
            tint: [1.0; 3],
        };
        color_grade(&mut f, &grade);
        let p = f.get_pixel(0, 0);
        assert!((p[0] - p[1]).abs() < 1e-6 && (p[1] - p[2]).abs() < 1e-6);
    }

    #[test]
    fn vignette_darkens_corners_not_center() {
        let mut f = solid(33, 33, 1.0);
        vignette(&mut f, 0.3);
        assert!((f.get_pixel(16, 16)[0] - 1.0).abs() < 1e-6);
        assert!((f.get_pixel(0, 0)[0] - 0.7).abs() < 1e-4);
    }

    #[test]
    fn golden_hour_warms() {
        let mut f = solid(2, 2, 0.0);
        golden_hour(&mut f);
        let p = f.get_pixel(0, 0);
        assert!((p[0] - 0.1).abs() < 1e-6);
        assert!((p[1] - 0.06).abs() < 1e-6);
        assert!((p[2] - 0.02).abs() < 1e-6);
    }

    #[test]
    fn light_rays_only_add() {
        let mut f = solid(40, 30, 0.2);
        light_rays(&mut f, 3, 0.2);
        assert!(f.iter().all(|v| *v >= 0.2));
        assert!(f.iter().any(|v| *v > 0.2));
    }

    #[test]
    fn grade_clips_after_grain_and_vignette() {
        let plan = EffectPlan::for_profile(&ContentProfile::from_prompt("a teapot"));
        let tail = EffectPlan {
            effects: plan
                .effects
                .into_iter()
                .filter_map(|e| match e {
                    Effect::FilmGrain { .. } => Some(Effect::FilmGrain { sigma: 0.0 }),
                    Effect::Vignette { .. } | Effect::ColorGrade { .. } => Some(e),
                    _ => None,
                })
                .collect(),
        };
        let ctx = FrameContext { index: 0, total: 1 };
        let mut rng = StdRng::seed_from_u64(0);

        let mut grey = solid(33, 33, 0.5);
        tail.apply(&mut grey, ctx, None, &mut rng);
        // 0.5 * 0.7 * 1.1 + 0.05
        assert!((grey.get_pixel(0, 0)[0] - 0.435).abs() < 1e-4);

        let mut black = solid(33, 33, 0.0);
        tail.apply(&mut black, ctx, None, &mut rng);
        // The lift is not darkened by the vignette.
        assert!((black.get_pixel(0, 0)[0] - 0.05).abs() < 1e-6);
        assert!((black.get_pixel(16, 16)[0] - 0.05).abs() < 1e-6);
    }

    #[test]
    fn grain_is_small() {
        let mut f = solid(32, 32, 0.5);
        film_grain(&mut f, 0.01, &mut StdRng::seed_from_u64(4));
        assert!(f.iter().all(|v| (v - 0.5).abs() < 0.1));
        let mean: f32 = f.iter().sum::<f32>() / f.len() as f32;
        assert!((mean - 0.5).abs() < 0.005);
        assert!(f.iter().any(|v| *v != 0.5));
    }

    #[test]
    fn soften_preserves_flat_fields_and_spreads_spikes() {
        let mut flat = solid(5, 5, 0.4);
        box_soften(&mut flat);
        assert!(flat.iter().all(|v| (v - 0.4).abs() < 1e-6));

        let mut spike = solid(5, 5, 0.0);
        spike.put_pixel(2, 2, Rgb([0.9, 0.9, 0.9]));
        box_soften(&mut spike);
        assert!((spike.get_pixel(2, 2)[0] - 0.1).abs() < 1e-6);
        assert!((spike.get_pixel(1, 1)[0] - 0.1).abs() < 1e-6);
        assert_eq!(spike.get_pixel(4, 4)[0], 0.0);
    }

    #[test]
    fn first_frame_skips_motion_blur() {
        let plan = EffectPlan {
            effects: vec![Effect::MotionBlur { trail: 0.5 }],
        };
        let mut f = solid(4, 4, 0.0);
        f.put_pixel(1, 1, Rgb([1.0, 1.0, 1.0]));
        let before = f.clone();
        let prev = solid(4, 4, 1.0);
        let mut rng = StdRng::seed_from_u64(0);
        plan.apply(&mut f, FrameContext { index: 0, total: 10 }, Some(&prev), &mut rng);
        assert_eq!(f, before);

        plan.apply(&mut f, FrameContext { index: 1, total: 10 }, Some(&prev), &mut rng);
        // Trail pulls every pixel halfway toward the white previous frame.
        assert!(f.iter().all(|v| *v >= 0.5));
    }
}
