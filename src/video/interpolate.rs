// PromptReel Frame Interpolation
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Maps an output frame index onto a pair of keyframes and blends them
// with an easing curve.

use image::Rgb32FImage;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

use crate::error::{GenError, GenResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InOutSine,
}

impl Ease {
    pub const ALL: [Ease; 8] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::InOutSine,
    ];

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InOutSine => {
                // cos(PI) lands a hair off -1.0; pin the endpoints.
                if t >= 1.0 {
                    1.0
                } else {
                    -((PI * t).cos() - 1.0) / 2.0
                }
            }
        }
    }
}

impl FromStr for Ease {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', '_'], "");
        Ease::ALL
            .iter()
            .copied()
            .find(|e| format!("{:?}", e).to_lowercase() == key)
            .ok_or_else(|| GenError::config(format!("unknown easing '{}'", s)))
    }
}

/// Where an output frame sits between keyframes: `(base index, t in [0,1))`.
///
/// `t == 0.0` with `base == n - 1` means "show the last keyframe as is".
pub fn keyframe_position(frame_idx: u32, total_frames: u32, keyframe_count: usize) -> (usize, f64) {
    if keyframe_count <= 1 || total_frames == 0 {
        return (0, 0.0);
    }
    let last = keyframe_count - 1;
    let progress = frame_idx as f64 / total_frames as f64;
    let pos = progress * last as f64;
    let base = pos.floor() as usize;
    if base >= last {
        (last, 0.0)
    } else {
        (base, pos - base as f64)
    }
}

/// Per-channel `a*(1-t) + b*t`. Both frames must share dimensions.
pub fn blend(a: &Rgb32FImage, b: &Rgb32FImage, t: f32) -> GenResult<Rgb32FImage> {
    if a.dimensions() != b.dimensions() {
        return Err(GenError::validation(format!(
            "cannot blend {}x{} with {}x{}",
            a.width(),
            a.height(),
            b.width(),
            b.height()
        )));
    }
    let mut out = a.clone();
    blend_into(&mut out, b, t);
    Ok(out)
}

/// In-place `dst = dst*(1-t) + src*t`; sizes are assumed equal.
pub(crate) fn blend_into(dst: &mut Rgb32FImage, src: &Rgb32FImage, t: f32) {
    let inv = 1.0 - t;
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = *d * inv + *s * t;
    }
}

/// Build output frame `frame_idx` from the keyframe list.
pub fn interpolate_frame(
    keyframes: &[Rgb32FImage],
    frame_idx: u32,
    total_frames: u32,
    ease: Ease,
) -> GenResult<Rgb32FImage> {
    if keyframes.is_empty() {
        return Err(GenError::validation("no keyframes to interpolate"));
    }
    let (base, t) = keyframe_position(frame_idx, total_frames, keyframes.len());
    if base + 1 >= keyframes.len() || t == 0.0 {
        return Ok(keyframes[base].clone());
    }
    blend(&keyframes[base], &keyframes[base + 1], ease.apply(t) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(v: f32) -> Rgb32FImage {
        Rgb32FImage::from_pixel(4, 4, Rgb([v, v, v]))
    }

    #[test]
    fn endpoints_are_stable() {
        for ease in Ease::ALL {
            assert_eq!(ease.apply(0.0), 0.0, "{:?}", ease);
            assert_eq!(ease.apply(1.0), 1.0, "{:?}", ease);
        }
    }

    #[test]
    fn monotonic_spot_check() {
        for ease in Ease::ALL {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b && b < c, "{:?}", ease);
        }
    }

    #[test]
    fn ease_names_parse() {
        assert_eq!("in-out-cubic".parse::<Ease>().unwrap(), Ease::InOutCubic);
        assert_eq!("linear".parse::<Ease>().unwrap(), Ease::Linear);
        assert!("bounce".parse::<Ease>().is_err());
    }

    #[test]
    fn position_walks_keyframes() {
        // 3 keyframes over 10 frames: halfway point sits on keyframe 1.
        assert_eq!(keyframe_position(0, 10, 3), (0, 0.0));
        let (base, t) = keyframe_position(5, 10, 3);
        assert_eq!(base, 1);
        assert!(t.abs() < 1e-9);
        let (base, t) = keyframe_position(9, 10, 3);
        assert_eq!(base, 1);
        assert!((t - 0.8).abs() < 1e-9);
    }

    #[test]
    fn single_keyframe_is_never_blended() {
        for f in 0..5 {
            assert_eq!(keyframe_position(f, 5, 1), (0, 0.0));
        }
        let frame = interpolate_frame(&[solid(0.3)], 2, 5, Ease::Linear).unwrap();
        assert_eq!(frame.get_pixel(0, 0)[0], 0.3);
    }

    #[test]
    fn blend_is_weighted_average() {
        let out = blend(&solid(0.0), &solid(1.0), 0.25).unwrap();
        assert!((out.get_pixel(1, 1)[2] - 0.25).abs() < 1e-6);
        assert!(blend(&solid(0.0), &Rgb32FImage::new(2, 2), 0.5).is_err());
    }

    #[test]
    fn interpolation_uses_easing() {
        let keys = [solid(0.0), solid(1.0)];
        // Frame 5 of 10 with two keyframes -> t = 0.5.
        let lin = interpolate_frame(&keys, 5, 10, Ease::Linear).unwrap();
        let cubic_in = interpolate_frame(&keys, 5, 10, Ease::InCubic).unwrap();
        assert!((lin.get_pixel(0, 0)[0] - 0.5).abs() < 1e-6);
        assert!((cubic_in.get_pixel(0, 0)[0] - 0.125).abs() < 1e-6);
    }

    #[test]
    fn empty_keyframes_error() {
        assert!(interpolate_frame(&[], 0, 10, Ease::Linear).is_err());
    }
}
