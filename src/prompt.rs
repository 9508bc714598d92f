// PromptReel Prompt Analysis
// Copyright (c) 2026 Xing_The_Creator | PromptReel
//
// Validation, quality enhancement and content-bucket classification of
// user prompts. The bucket drives effect, hook and audio selection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GenError, GenResult};

pub const MIN_PROMPT_CHARS: usize = 3;
pub const MAX_PROMPT_CHARS: usize = 500;

const BLOCKED_FRAGMENTS: &[&str] = &["<script", "<?php", "javascript:", "data:", "vbscript:"];

const QUALITY_TERMS: &[&str] = &[
    "high quality",
    "detailed",
    "professional",
    "8k",
    "masterpiece",
    "best quality",
    "ultra detailed",
    "photorealistic",
];

const QUALITY_SUFFIX: &str = ", high quality, detailed, professional";

/// Trim and check a raw prompt. Returns the trimmed prompt.
pub fn validate_prompt(raw: &str) -> GenResult<String> {
    let prompt = raw.trim();

    if prompt.is_empty() {
        return Err(GenError::validation(
            "Please enter a prompt for video generation.",
        ));
    }

    let len = prompt.chars().count();
    if len < MIN_PROMPT_CHARS {
        return Err(GenError::validation(format!(
            "Prompt must be at least {} characters.",
            MIN_PROMPT_CHARS
        )));
    }
    if len > MAX_PROMPT_CHARS {
        return Err(GenError::validation(format!(
            "Prompt must be at most {} characters.",
            MAX_PROMPT_CHARS
        )));
    }

    if !prompt.chars().any(char::is_alphanumeric) {
        return Err(GenError::validation(
            "Prompt must contain letters or numbers.",
        ));
    }

    let lower = prompt.to_lowercase();
    if BLOCKED_FRAGMENTS.iter().any(|frag| lower.contains(frag)) {
        return Err(GenError::validation("Prompt contains disallowed content."));
    }

    Ok(prompt.to_string())
}

/// Append quality terms for the hosted models unless the prompt already
/// carries one or is near the length limit.
pub fn enhance_prompt(prompt: &str) -> String {
    let formatted = prompt.trim();
    let lower = formatted.to_lowercase();
    let has_quality = QUALITY_TERMS.iter().any(|term| lower.contains(term));

    if !has_quality && formatted.chars().count() < 400 {
        format!("{}{}", formatted, QUALITY_SUFFIX)
    } else {
        formatted.to_string()
    }
}

/// Keyword-derived classification of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentBucket {
    Dance,
    Action,
    Fire,
    Water,
    Winter,
    Animal,
    Scenic,
    General,
}

impl ContentBucket {
    /// Priority order used by [`ContentBucket::classify`]; first match wins.
    pub const PRIORITY: [ContentBucket; 7] = [
        ContentBucket::Dance,
        ContentBucket::Action,
        ContentBucket::Water,
        ContentBucket::Fire,
        ContentBucket::Winter,
        ContentBucket::Animal,
        ContentBucket::Scenic,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            ContentBucket::Dance => &["dance", "dancing", "dancer", "ballet", "party", "disco"],
            ContentBucket::Action => &[
                "action", "fight", "fighting", "battle", "fast", "speed", "racing", "race",
                "explosion",
            ],
            ContentBucket::Fire => &[
                "fire", "flame", "burning", "lava", "volcano", "bonfire", "campfire", "wildfire",
            ],
            ContentBucket::Water => &[
                "water", "underwater", "rain", "ocean", "sea", "river", "wave", "lake",
            ],
            ContentBucket::Winter => &["snow", "winter", "ice", "frozen"],
            ContentBucket::Animal => &["cat", "dog", "animal", "pet", "bird", "fish", "puppy", "kitten"],
            ContentBucket::Scenic => &[
                "beautiful", "stunning", "amazing", "landscape", "mountain", "forest", "sunset",
                "nature",
            ],
            ContentBucket::General => &[],
        }
    }

    pub fn classify(prompt: &str) -> ContentBucket {
        let words = tokenize(prompt);
        Self::PRIORITY
            .iter()
            .copied()
            .find(|bucket| {
                bucket
                    .keywords()
                    .iter()
                    .any(|kw| words.iter().any(|w| stem_matches(w, kw)))
            })
            .unwrap_or(ContentBucket::General)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentBucket::Dance => "dance",
            ContentBucket::Action => "action",
            ContentBucket::Fire => "fire",
            ContentBucket::Water => "water",
            ContentBucket::Winter => "winter",
            ContentBucket::Animal => "animal",
            ContentBucket::Scenic => "scenic",
            ContentBucket::General => "general",
        }
    }

    /// Buckets whose footage reads as fast motion.
    pub fn is_motion_heavy(self) -> bool {
        matches!(self, ContentBucket::Dance | ContentBucket::Action)
    }
}

impl fmt::Display for ContentBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket plus the lighting modifier that applies across buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentProfile {
    pub bucket: ContentBucket,
    pub golden_hour: bool,
}

impl ContentProfile {
    pub fn from_prompt(prompt: &str) -> Self {
        let lower = prompt.to_lowercase();
        Self {
            bucket: ContentBucket::classify(prompt),
            golden_hour: lower.contains("sunset") || lower.contains("golden"),
        }
    }
}

pub(crate) fn tokenize(prompt: &str) -> Vec<String> {
    prompt
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

// Words that start with a bucket keyword without being about it.
const STEM_EXCEPTIONS: &[&str] = &[
    "catalog", "categor", "catch", "cathedral", "dogma", "petal", "petition", "petrol",
    "season", "seat", "search", "rainbow", "fasten", "discount", "discover", "lavator",
];

// Stem match for bucket keywords: "rainy", "snowfall" and "dancers" count,
// "catalog" and "season" do not.
pub(crate) fn stem_matches(word: &str, keyword: &str) -> bool {
    word.starts_with(keyword) && !STEM_EXCEPTIONS.iter().any(|e| word.starts_with(e))
}

// Whole-word match, tolerating a plural suffix ("cats", "waves").
pub(crate) fn word_matches(word: &str, keyword: &str) -> bool {
    matches!(word.strip_prefix(keyword), Some("" | "s" | "es"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_and_accepts() {
        assert_eq!(
            validate_prompt("  a cat on a roof  ").unwrap(),
            "a cat on a roof"
        );
    }

    #[test]
    fn validate_rejects_bad_prompts() {
        assert!(validate_prompt("").is_err());
        assert!(validate_prompt("   ").is_err());
        assert!(validate_prompt("ab").is_err());
        assert!(validate_prompt("!!!???").is_err());
        assert!(validate_prompt(&"x".repeat(501)).is_err());
        assert!(validate_prompt("cat <SCRIPT>alert(1)</script>").is_err());
        assert!(validate_prompt("open javascript:void").is_err());
    }

    #[test]
    fn validate_length_counts_chars_not_bytes() {
        let prompt = "é".repeat(500);
        assert!(validate_prompt(&prompt).is_ok());
    }

    #[test]
    fn enhance_appends_quality_terms_once() {
        assert_eq!(
            enhance_prompt("a red fox"),
            "a red fox, high quality, detailed, professional"
        );
        assert_eq!(
            enhance_prompt("a red fox, 8K masterpiece"),
            "a red fox, 8K masterpiece"
        );
        let long = "a".repeat(420);
        assert_eq!(enhance_prompt(&long), long);
    }

    #[test]
    fn classify_picks_expected_buckets() {
        assert_eq!(ContentBucket::classify("people dancing at a party"), ContentBucket::Dance);
        assert_eq!(ContentBucket::classify("A huge WATERFALL in Iceland"), ContentBucket::Water);
        assert_eq!(ContentBucket::classify("two samurai fighting"), ContentBucket::Action);
        assert_eq!(ContentBucket::classify("burning candle"), ContentBucket::Fire);
        assert_eq!(ContentBucket::classify("two cats sleeping"), ContentBucket::Animal);
        assert_eq!(ContentBucket::classify("stunning mountain view"), ContentBucket::Scenic);
        assert_eq!(ContentBucket::classify("a teapot"), ContentBucket::General);
    }

    #[test]
    fn classify_respects_priority() {
        // Dance outranks animal.
        assert_eq!(ContentBucket::classify("a dog dancing"), ContentBucket::Dance);
        // Fire outranks scenic.
        assert_eq!(ContentBucket::classify("beautiful lava flow"), ContentBucket::Fire);
        // Water is checked before fire.
        assert_eq!(ContentBucket::classify("fire and rain"), ContentBucket::Water);
    }

    #[test]
    fn classify_matches_inflected_and_compound_words() {
        assert_eq!(ContentBucket::classify("a rainy night in tokyo"), ContentBucket::Water);
        assert_eq!(ContentBucket::classify("underwater city"), ContentBucket::Water);
        assert_eq!(ContentBucket::classify("snowfall over the village"), ContentBucket::Winter);
        assert_eq!(ContentBucket::classify("snowflakes on glass"), ContentBucket::Winter);
        assert_eq!(ContentBucket::classify("a bonfire on the beach"), ContentBucket::Fire);
        assert_eq!(ContentBucket::classify("flames everywhere"), ContentBucket::Fire);
        assert_eq!(ContentBucket::classify("two dancers"), ContentBucket::Dance);
    }

    #[test]
    fn classify_skips_known_false_stems() {
        assert_eq!(ContentBucket::classify("a nice price"), ContentBucket::General);
        assert_eq!(ContentBucket::classify("breakfast in season"), ContentBucket::General);
        assert_eq!(ContentBucket::classify("a catalog of petals"), ContentBucket::General);
        assert_eq!(ContentBucket::classify("a rainbow seat"), ContentBucket::General);
    }

    #[test]
    fn golden_hour_flag() {
        let p = ContentProfile::from_prompt("Golden retriever at sunset");
        assert!(p.golden_hour);
        assert_eq!(p.bucket, ContentBucket::Scenic);
        assert!(!ContentProfile::from_prompt("grey morning").golden_hour);
    }
}
