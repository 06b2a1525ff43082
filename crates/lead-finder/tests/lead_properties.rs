use chrono::NaiveDate;
use lead_finder::leads::{
    artifact_filename, normalize, parse_value, CompanyInfo, CsvExporter, ExportProfile,
    FacebookInfo, HygieneRating, HygieneScores, Lead, Officer, QuoteMode, RecentReview,
    ReviewStats, Scalar, SentimentTier,
};
use proptest::collection::vec;
use proptest::option::of;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Non-blank text with no surrounding whitespace, so trimming is a no-op.
fn text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]([A-Za-z0-9 ,.&'-]{0,14}[A-Za-z0-9])?"
}

fn texts() -> impl Strategy<Value = Vec<String>> {
    vec(text(), 0..3)
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2030, 1u32..=12, 1u32..=28).prop_map(|(year, month, day)| {
        NaiveDate::from_ymd_opt(year, month, day).expect("day 1-28 exists in every month")
    })
}

fn scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        (0u8..=5).prop_map(|level| Scalar::Number(f64::from(level))),
        text().prop_map(Scalar::Text),
    ]
}

fn review_stats() -> impl Strategy<Value = Option<ReviewStats>> {
    let review = (text(), of(1u8..=5), of(-1.0f64..=1.0)).prop_map(|(text, rating, sentiment)| {
        RecentReview {
            text,
            rating,
            sentiment,
        }
    });
    (of(-1.0f64..=1.0), vec(review, 0..3)).prop_map(|(average_sentiment, recent_reviews)| {
        let empty = average_sentiment.is_none() && recent_reviews.is_empty();
        (!empty).then_some(ReviewStats {
            average_sentiment,
            recent_reviews,
        })
    })
}

fn hygiene_rating() -> impl Strategy<Value = Option<HygieneRating>> {
    let scores = (of(text()), of(text()), of(text())).prop_map(
        |(food_hygiene, structural, management)| {
            let empty = food_hygiene.is_none() && structural.is_none() && management.is_none();
            (!empty).then_some(HygieneScores {
                food_hygiene,
                structural,
                management,
            })
        },
    );
    (of(scalar()), of(date()), scores).prop_map(|(rating, last_inspection, scores)| {
        let empty = rating.is_none() && last_inspection.is_none() && scores.is_none();
        (!empty).then_some(HygieneRating {
            rating,
            last_inspection,
            scores,
        })
    })
}

fn company_info() -> impl Strategy<Value = Option<CompanyInfo>> {
    (of(text()), of(date()), of(text()), texts()).prop_map(
        |(company_number, date_of_creation, company_status, sic_codes)| {
            let empty = company_number.is_none()
                && date_of_creation.is_none()
                && company_status.is_none()
                && sic_codes.is_empty();
            (!empty).then_some(CompanyInfo {
                company_number,
                date_of_creation,
                company_status,
                sic_codes,
            })
        },
    )
}

fn officer() -> impl Strategy<Value = Officer> {
    (text(), of(text()), of(date()), of(text()), of(text())).prop_map(
        |(name, role, appointed_on, nationality, country_of_residence)| Officer {
            name,
            role,
            appointed_on,
            nationality,
            country_of_residence,
        },
    )
}

fn facebook_info() -> impl Strategy<Value = Option<FacebookInfo>> {
    (of(text()), of(text()), of(text())).prop_map(|(business_owner, opening_date, facebook_url)| {
        let empty = business_owner.is_none() && opening_date.is_none() && facebook_url.is_none();
        (!empty).then_some(FacebookInfo {
            business_owner,
            opening_date,
            facebook_url,
        })
    })
}

fn lead_strategy() -> impl Strategy<Value = Lead> {
    let contact = (
        text(),
        "([A-Za-z0-9][A-Za-z0-9 ,.-]{0,30})?",
        of(text()),
        of("[a-z]{1,8}@[a-z]{1,8}\\.com"),
        of(text()),
        of(text()),
    );
    let listing = (
        of(scalar()),
        of(0.0f64..=5.0),
        of(0u64..100_000),
        texts(),
        texts(),
        texts(),
    );
    let groups = (
        review_stats(),
        hygiene_rating(),
        company_info(),
        vec(officer(), 0..3),
        facebook_info(),
    );

    (contact, listing, groups).prop_map(
        |(
            (name, address, phone, email, website, cuisine_type),
            (price_level, rating, total_reviews, additional_emails, additional_phones, opening_hours),
            (review_stats, hygiene_rating, company_info, management, facebook_info),
        )| Lead {
            name,
            address,
            phone,
            email,
            website,
            cuisine_type,
            price_level,
            rating,
            total_reviews,
            additional_emails,
            additional_phones,
            opening_hours,
            review_stats,
            hygiene_rating,
            company_info,
            management,
            facebook_info,
        },
    )
}

proptest! {
    #[test]
    fn normalizing_arbitrary_fields_never_panics(
        name in "[A-Za-z]{1,12}",
        rating in proptest::num::f64::ANY,
        reviews in any::<i64>(),
        sentiment in "\\PC{0,8}",
    ) {
        let record = json!({
            "name": name,
            "rating": rating,
            "totalReviews": reviews,
            "reviewStats": { "averageSentiment": sentiment },
            "hygieneRating": { "rating": sentiment },
        });
        let records = parse_value(Value::Array(vec![record])).expect("named record parses");
        let lead = normalize(&records[0]);
        prop_assert_eq!(lead.name, name);
        if let Some(rating) = lead.rating {
            prop_assert!((0.0..=5.0).contains(&rating));
        }
    }

    #[test]
    fn normalization_is_idempotent(lead in lead_strategy()) {
        let raw = lead.to_raw().expect("lead serializes");
        let records = parse_value(Value::Array(vec![raw])).expect("lead parses");
        prop_assert_eq!(normalize(&records[0]), lead);
    }

    #[test]
    fn sentiment_tiers_cover_the_score_range(score in -1.0f64..=1.0) {
        let tier = SentimentTier::from_score(score).expect("finite score classifies");
        let expected = if score > 0.5 {
            SentimentTier::Positive
        } else if score > 0.0 {
            SentimentTier::MildPositive
        } else if score > -0.5 {
            SentimentTier::MildNegative
        } else {
            SentimentTier::Negative
        };
        prop_assert_eq!(tier, expected);
    }

    #[test]
    fn export_has_one_line_per_lead_plus_header(
        leads in proptest::collection::vec(lead_strategy(), 1..12),
    ) {
        let exporter = CsvExporter::new(ExportProfile::Standard, QuoteMode::Standard);
        let bytes = exporter.render(&leads).expect("render succeeds").expect("non-empty");
        let text = String::from_utf8(bytes).expect("utf-8 csv");

        prop_assert!(!text.ends_with('\n'));
        let lines: Vec<&str> = text.split('\n').collect();
        prop_assert_eq!(lines.len(), leads.len() + 1);
        for line in &lines[1..] {
            prop_assert_eq!(line.matches('"').count(), 2 * ExportProfile::Standard.columns().len());
        }
    }

    #[test]
    fn artifact_filenames_are_path_safe(term in "\\PC{0,40}") {
        let filename = artifact_filename(&term);
        prop_assert!(filename.starts_with("restaurants-"));
        prop_assert!(filename.ends_with(".csv"));
        prop_assert!(!filename.contains(['/', '\\', ':', '*', '?', '"', '<', '>', '|']));
    }
}
