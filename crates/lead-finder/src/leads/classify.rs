use super::domain::{HygieneRating, Lead, ReviewStats, Scalar};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentTier {
    Positive,
    MildPositive,
    MildNegative,
    Negative,
}

impl SentimentTier {
    /// Buckets a sentiment score. The lower bound of each bucket is open:
    /// exactly `0.5` is mild-positive and exactly `-0.5` is mild-negative.
    pub fn from_score(score: f64) -> Option<Self> {
        if !score.is_finite() {
            return None;
        }

        let tier = if score > 0.5 {
            Self::Positive
        } else if score > 0.0 {
            Self::MildPositive
        } else if score > -0.5 {
            Self::MildNegative
        } else {
            Self::Negative
        };
        Some(tier)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::MildPositive => "mild-positive",
            Self::MildNegative => "mild-negative",
            Self::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HygieneTier {
    Good,
    Warn,
    Bad,
    Unknown,
}

impl HygieneTier {
    pub fn from_rating(rating: &Scalar) -> Self {
        match coerce_integer(rating) {
            Some(value) if value >= 4 => Self::Good,
            Some(value) if value >= 3 => Self::Warn,
            Some(_) => Self::Bad,
            None => Self::Unknown,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warn => "warn",
            Self::Bad => "bad",
            Self::Unknown => "unknown",
        }
    }
}

pub fn sentiment_tier(stats: &ReviewStats) -> Option<SentimentTier> {
    stats.average_sentiment.and_then(SentimentTier::from_score)
}

/// A hygiene group without a rating classifies as [`HygieneTier::Unknown`].
pub fn hygiene_tier(hygiene: &HygieneRating) -> HygieneTier {
    hygiene
        .rating
        .as_ref()
        .map_or(HygieneTier::Unknown, HygieneTier::from_rating)
}

impl Lead {
    pub fn sentiment_tier(&self) -> Option<SentimentTier> {
        self.review_stats.as_ref().and_then(sentiment_tier)
    }

    pub fn hygiene_tier(&self) -> Option<HygieneTier> {
        self.hygiene_rating.as_ref().map(hygiene_tier)
    }
}

/// Numbers truncate toward zero; text yields its leading integer, so
/// `"5 - Very Good"` reads as 5 and `"AwaitingInspection"` as nothing.
fn coerce_integer(rating: &Scalar) -> Option<i64> {
    match rating {
        Scalar::Number(value) if value.is_finite() => Some(value.trunc() as i64),
        Scalar::Number(_) => None,
        Scalar::Text(text) => leading_integer(text),
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}
