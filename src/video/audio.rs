// PromptReel Background Audio
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Procedural soundtrack per content bucket: a sustained chord pad, an
// optional beat pulse and an optional noise wash, written as 16-bit WAV
// and muxed under the silent video with ffmpeg.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::path::Path;
use std::process::Command;
use tracing::info;

use crate::error::{GenError, GenResult};
use crate::prompt::ContentBucket;

pub const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioProfile {
    pub root_hz: f32,
    /// Semitone offsets from the root.
    pub chord: Vec<i32>,
    pub bpm: f32,
    /// Beat pulse level, 0 for none.
    pub pulse: f32,
    /// Low-passed noise level, 0 for none.
    pub noise: f32,
}

impl AudioProfile {
    pub fn for_bucket(bucket: ContentBucket) -> Self {
        let (root_hz, chord, bpm, pulse, noise): (f32, &[i32], f32, f32, f32) = match bucket {
            ContentBucket::Dance => (110.0, &[0, 7, 12, 16], 124.0, 0.55, 0.0),
            ContentBucket::Action => (98.0, &[0, 3, 7, 10], 140.0, 0.5, 0.05),
            ContentBucket::Fire => (87.3, &[0, 3, 7], 90.0, 0.2, 0.15),
            ContentBucket::Water => (130.8, &[0, 4, 7, 11], 70.0, 0.0, 0.2),
            ContentBucket::Winter => (146.8, &[0, 5, 7, 14], 60.0, 0.0, 0.06),
            ContentBucket::Animal => (196.0, &[0, 4, 7], 100.0, 0.15, 0.0),
            ContentBucket::Scenic => (110.0, &[0, 7, 14, 16], 66.0, 0.0, 0.04),
            ContentBucket::General => (123.5, &[0, 4, 7, 12], 90.0, 0.1, 0.0),
        };
        Self {
            root_hz,
            chord: chord.to_vec(),
            bpm,
            pulse,
            noise,
        }
    }
}

/// Mono samples, peak-normalized to ~80% full scale.
pub fn synthesize<R: Rng + ?Sized>(
    profile: &AudioProfile,
    seconds: f32,
    sample_rate: u32,
    rng: &mut R,
) -> Vec<i16> {
    let n = (seconds.max(0.0) * sample_rate as f32) as usize;
    if n == 0 {
        return Vec::new();
    }
    let sr = sample_rate as f32;
    let freqs: Vec<f32> = profile
        .chord
        .iter()
        .map(|st| profile.root_hz * 2f32.powf(*st as f32 / 12.0))
        .collect();
    let beat_len = if profile.bpm > 0.0 { 60.0 / profile.bpm } else { f32::MAX };
    let attack = 1.0f32.min(seconds * 0.2);
    let release = 1.5f32.min(seconds * 0.3);

    let mut out = Vec::with_capacity(n);
    let mut noise_state = 0.0f32;

    for i in 0..n {
        let t = i as f32 / sr;

        let mut s: f32 = freqs
            .iter()
            .map(|f| (TAU * f * t).sin() + 0.3 * (TAU * f * 2.0 * t).sin())
            .sum::<f32>()
            / freqs.len().max(1) as f32;
        s *= 0.5;

        if profile.pulse > 0.0 {
            let in_beat = t % beat_len;
            let env = (-in_beat * 18.0).exp();
            s += profile.pulse * env * (TAU * 55.0 * in_beat).sin();
        }

        if profile.noise > 0.0 {
            let white: f32 = rng.gen_range(-1.0..1.0);
            noise_state += 0.05 * (white - noise_state);
            s += profile.noise * noise_state * 4.0;
        }

        let fade_in = if attack > 0.0 { (t / attack).min(1.0) } else { 1.0 };
        let fade_out = if release > 0.0 { ((seconds - t) / release).clamp(0.0, 1.0) } else { 1.0 };
        out.push(s * fade_in * fade_out);
    }

    let peak = out.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    let gain = if peak > 0.0 { 0.8 / peak } else { 0.0 };
    out.into_iter()
        .map(|v| (v * gain * i16::MAX as f32) as i16)
        .collect()
}

pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> GenResult<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| GenError::audio(format!("cannot create {:?}: {}", path, e)))?;
    for s in samples {
        writer
            .write_sample(*s)
            .map_err(|e| GenError::audio(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| GenError::audio(e.to_string()))?;
    Ok(())
}

/// Lay `audio` under `video`, copying the video stream.
pub fn mux_audio(video: &Path, audio: &Path, output: &Path) -> GenResult<()> {
    info!("[AUDIO] Muxing {:?} + {:?} -> {:?}", video, audio, output);
    let out = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-i"])
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args([
            "-map", "0:v:0",
            "-map", "1:a:0",
            "-c:v", "copy",
            "-c:a", "aac",
            "-b:a", "128k",
            "-shortest",
        ])
        .arg(output)
        .output()
        .map_err(|e| GenError::audio(format!("failed to run ffmpeg: {e}")))?;

    if !out.status.success() {
        return Err(GenError::audio(format!(
            "ffmpeg mux failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}
