use super::domain::{
    CompanyInfo, FacebookInfo, HygieneRating, HygieneScores, Lead, Officer, RecentReview,
    ReviewStats, Scalar,
};
use super::parser::RawLead;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;
use tracing::debug;

const RATING_RANGE: RangeInclusive<f64> = 0.0..=5.0;
const SENTIMENT_RANGE: RangeInclusive<f64> = -1.0..=1.0;
const REVIEW_RATING_RANGE: RangeInclusive<f64> = 1.0..=5.0;

/// Maps every raw record to a [`Lead`], preserving length and order.
pub fn normalize_all(records: &[RawLead]) -> Vec<Lead> {
    records.iter().map(normalize).collect()
}

/// Maps one raw record to a [`Lead`].
///
/// Never fails: optional fields with a missing, blank, mistyped, or
/// out-of-range value are treated as absent.
pub fn normalize(record: &RawLead) -> Lead {
    let fields = Fields::new(record.fields(), record.name());

    Lead {
        address: fields
            .text(&["address", "formattedAddress", "formatted_address"])
            .unwrap_or_default(),
        phone: fields.text(&["phone", "formattedPhoneNumber", "formatted_phone_number"]),
        email: fields.text(&["email"]),
        website: fields.text(&["website"]),
        cuisine_type: fields.text(&["cuisineType", "cuisine_type"]),
        price_level: fields.scalar(&["priceLevel", "price_level"]),
        rating: fields.bounded("rating", &["rating"], RATING_RANGE),
        total_reviews: fields.count(&["totalReviews", "total_reviews", "userRatingsTotal"]),
        additional_emails: fields.texts(&["additionalEmails", "additional_emails"]),
        additional_phones: fields.texts(&["additionalPhones", "additional_phones"]),
        opening_hours: fields.texts(&["openingHours", "opening_hours"]),
        review_stats: fields
            .group(&["reviewStats", "review_stats"])
            .and_then(|group| review_stats(&group)),
        hygiene_rating: fields
            .group(&["hygieneRating", "hygiene_rating"])
            .and_then(|group| hygiene_rating(&group)),
        company_info: fields
            .group(&["companyInfo", "company_info"])
            .and_then(|group| company_info(&group)),
        management: fields
            .items(&["management"])
            .filter_map(|item| officer(&item))
            .collect(),
        facebook_info: fields
            .group(&["facebookInfo", "facebook_info"])
            .and_then(|group| facebook_info(&group)),
        name: record.name().to_string(),
    }
}

fn review_stats(fields: &Fields<'_>) -> Option<ReviewStats> {
    let stats = ReviewStats {
        average_sentiment: fields.bounded(
            "averageSentiment",
            &["averageSentiment", "average_sentiment"],
            SENTIMENT_RANGE,
        ),
        recent_reviews: fields
            .items(&["recentReviews", "recent_reviews"])
            .filter_map(|item| recent_review(&item))
            .collect(),
    };

    (stats.average_sentiment.is_some() || !stats.recent_reviews.is_empty()).then_some(stats)
}

fn recent_review(fields: &Fields<'_>) -> Option<RecentReview> {
    let review = RecentReview {
        text: fields.text(&["text"]).unwrap_or_default(),
        rating: fields
            .bounded("review rating", &["rating"], REVIEW_RATING_RANGE)
            .filter(|rating| rating.fract() == 0.0)
            .map(|rating| rating as u8),
        sentiment: fields.bounded("review sentiment", &["sentiment"], SENTIMENT_RANGE),
    };

    let empty = review.text.is_empty() && review.rating.is_none() && review.sentiment.is_none();
    (!empty).then_some(review)
}

fn hygiene_rating(fields: &Fields<'_>) -> Option<HygieneRating> {
    let scores = fields.group(&["scores"]).and_then(|scores| {
        let scores = HygieneScores {
            food_hygiene: scores.text(&["foodHygiene", "food_hygiene", "hygiene"]),
            structural: scores.text(&["structural"]),
            management: scores.text(&["management", "confidenceInManagement"]),
        };
        let empty =
            scores.food_hygiene.is_none() && scores.structural.is_none() && scores.management.is_none();
        (!empty).then_some(scores)
    });

    let rating = HygieneRating {
        rating: fields.scalar(&["rating", "ratingValue", "rating_value"]),
        last_inspection: fields.date(&["lastInspection", "last_inspection", "ratingDate"]),
        scores,
    };

    let empty = rating.rating.is_none() && rating.last_inspection.is_none() && rating.scores.is_none();
    (!empty).then_some(rating)
}

fn company_info(fields: &Fields<'_>) -> Option<CompanyInfo> {
    let info = CompanyInfo {
        company_number: fields.text(&["companyNumber", "company_number"]),
        date_of_creation: fields.date(&["dateOfCreation", "date_of_creation"]),
        company_status: fields.text(&["companyStatus", "company_status"]),
        sic_codes: fields.texts(&["sicCodes", "sic_codes"]),
    };

    let empty = info.company_number.is_none()
        && info.date_of_creation.is_none()
        && info.company_status.is_none()
        && info.sic_codes.is_empty();
    (!empty).then_some(info)
}

fn officer(fields: &Fields<'_>) -> Option<Officer> {
    Some(Officer {
        name: fields.text(&["name"])?,
        role: fields.text(&["role", "officerRole", "officer_role"]),
        appointed_on: fields.date(&["appointedOn", "appointed_on"]),
        nationality: fields.text(&["nationality"]),
        country_of_residence: fields.text(&["countryOfResidence", "country_of_residence"]),
    })
}

fn facebook_info(fields: &Fields<'_>) -> Option<FacebookInfo> {
    let info = FacebookInfo {
        business_owner: fields.text(&["businessOwner", "business_owner"]),
        opening_date: fields.text(&["openingDate", "opening_date"]),
        facebook_url: fields.text(&["facebookUrl", "facebook_url"]),
    };

    let empty =
        info.business_owner.is_none() && info.opening_date.is_none() && info.facebook_url.is_none();
    (!empty).then_some(info)
}

/// Read-only accessor over one JSON object. Keys are tried in order and the
/// first non-null value wins.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    lead: &'a str,
}

impl<'a> Fields<'a> {
    fn new(map: &'a Map<String, Value>, lead: &'a str) -> Self {
        Self { map, lead }
    }

    fn get(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find(|value| !value.is_null())
    }

    fn text(&self, keys: &[&str]) -> Option<String> {
        self.get(keys).and_then(as_text)
    }

    fn texts(&self, keys: &[&str]) -> Vec<String> {
        match self.get(keys) {
            Some(Value::Array(items)) => items.iter().filter_map(as_text).collect(),
            _ => Vec::new(),
        }
    }

    fn scalar(&self, keys: &[&str]) -> Option<Scalar> {
        match self.get(keys)? {
            Value::Number(number) => number.as_f64().filter(|n| n.is_finite()).map(Scalar::Number),
            Value::String(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| Scalar::Text(trimmed.to_string()))
            }
            _ => None,
        }
    }

    fn number(&self, keys: &[&str]) -> Option<f64> {
        let number = match self.get(keys)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        number.filter(|n| n.is_finite())
    }

    fn bounded(&self, label: &str, keys: &[&str], range: RangeInclusive<f64>) -> Option<f64> {
        let value = self.number(keys)?;
        if range.contains(&value) {
            Some(value)
        } else {
            debug!(lead = self.lead, field = label, value, "dropping out-of-range value");
            None
        }
    }

    fn count(&self, keys: &[&str]) -> Option<u64> {
        let value = self.number(keys)?;
        if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
            Some(value as u64)
        } else {
            debug!(lead = self.lead, value, "dropping invalid review count");
            None
        }
    }

    fn date(&self, keys: &[&str]) -> Option<NaiveDate> {
        let raw = self.get(keys)?.as_str()?;
        let parsed = parse_date(raw);
        if parsed.is_none() {
            debug!(lead = self.lead, value = raw, "dropping unparsable date");
        }
        parsed
    }

    fn group(&self, keys: &[&str]) -> Option<Fields<'a>> {
        match self.get(keys)? {
            Value::Object(map) => Some(Fields::new(map, self.lead)),
            _ => None,
        }
    }

    fn items(&self, keys: &[&str]) -> impl Iterator<Item = Fields<'a>> + 'a {
        let lead = self.lead;
        let items: &'a [Value] = match self.get(keys) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        };
        items.iter().filter_map(move |item| match item {
            Value::Object(map) => Some(Fields::new(map, lead)),
            _ => None,
        })
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    None
}
