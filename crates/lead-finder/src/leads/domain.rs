use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Value that upstream providers deliver either as text or as a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(value) => write!(f, "{value}"),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

/// One normalized business record.
///
/// Only `name` and `address` are always present. Every other field and group
/// is independently optional; absent collections are empty rather than `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_emails: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_phones: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub opening_hours: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_stats: Option<ReviewStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hygiene_rating: Option<HygieneRating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_info: Option<CompanyInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub management: Vec<Officer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_info: Option<FacebookInfo>,
}

impl Lead {
    /// Minimal lead with every optional field absent.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            phone: None,
            email: None,
            website: None,
            cuisine_type: None,
            price_level: None,
            rating: None,
            total_reviews: None,
            additional_emails: Vec::new(),
            additional_phones: Vec::new(),
            opening_hours: Vec::new(),
            review_stats: None,
            hygiene_rating: None,
            company_info: None,
            management: Vec::new(),
            facebook_info: None,
        }
    }

    /// Projects the lead back into the provider's camelCase wire shape,
    /// omitting absent fields.
    pub fn to_raw(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_sentiment: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recent_reviews: Vec<RecentReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentReview {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HygieneRating {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_inspection: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<HygieneScores>,
}

/// Inspection sub-scores; providers publish these as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HygieneScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_hygiene: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_creation: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_status: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sic_codes: Vec<String>,
}

/// Company officer listed under a lead's management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointed_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_of_residence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_url: Option<String>,
}
