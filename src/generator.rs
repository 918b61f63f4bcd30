//! Sample Data Generation
//!
//! - `random_section` / `random_sections`: graded sections for new cards
//! - `sample_cards`: the three cards preseeded into the in-memory store
//! - `generate_dataset`: monthly account cards for the demo dataset
//!
//! Every function takes its RNG from the caller so tests can seed it.
//! Grade and score are drawn independently.

use crate::model::{LetterGrade, ReportCard, Score, Section};
use crate::registry::{CUSTOM_AGENCY, FUNNEL, QUICKBOOKS_CORE};
use chrono::NaiveDate;
use rand::Rng;
use std::collections::BTreeMap;

pub const ACCOUNT_NAMES: [&str; 10] = [
    "Arctic Air HVAC Solutions",
    "Sunshine Plumbing & Heating",
    "Premier Comfort Systems",
    "Blue Ridge Mechanical",
    "Coastal Climate Control",
    "Mountain View Plumbing",
    "Valley Heating & Cooling",
    "Metro Plumbing Experts",
    "Elite HVAC Services",
    "Precision Pipe & Climate",
];

pub const COMMENT_PHRASES: [&str; 12] = [
    "Excellent performance",
    "Strong results",
    "Good progress",
    "Needs improvement",
    "Outstanding work",
    "Solid execution",
    "Room for growth",
    "Exceeds expectations",
    "Meets standards",
    "Requires attention",
    "Impressive gains",
    "Steady improvement",
];

/// Chance of each optional card type per account per month
pub const OPTIONAL_CARD_PROBABILITY: f64 = 0.5;

/// First days of January through October 2025
pub fn dataset_months() -> Vec<NaiveDate> {
    (1..=10)
        .filter_map(|month| NaiveDate::from_ymd_opt(2025, month, 1))
        .collect()
}

// ============================================================================
// Sections
// ============================================================================

pub fn random_score<R: Rng + ?Sized>(rng: &mut R) -> Score {
    Score::from_hundredths(rng.gen_range(100..=500))
}

pub fn random_section<R: Rng + ?Sized>(rng: &mut R) -> Section {
    let grade = LetterGrade::ALL[rng.gen_range(0..LetterGrade::ALL.len())];
    let comment = COMMENT_PHRASES[rng.gen_range(0..COMMENT_PHRASES.len())];
    Section {
        grade,
        score: random_score(rng),
        comment: comment.to_string(),
    }
}

/// Two independent sections, the shape every generated card carries
pub fn random_sections<R: Rng + ?Sized>(rng: &mut R) -> Vec<Section> {
    vec![random_section(rng), random_section(rng)]
}

/// Version-4 uuid built from the caller's RNG
pub fn random_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
}

// ============================================================================
// Preseeded Cards
// ============================================================================

fn fixed_section(grade: LetterGrade, hundredths: u16, comment: &str) -> Section {
    Section {
        grade,
        score: Score::from_hundredths(hundredths),
        comment: comment.to_string(),
    }
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Sample cards for the in-memory store, one per account card type
pub fn sample_cards() -> Vec<ReportCard> {
    vec![
        ReportCard {
            id: 1,
            uuid: "3f6c2b9e-1d4a-4c8e-9b27-5a0d8e71c401".to_string(),
            card_type: FUNNEL.to_string(),
            parameters: params(&[
                ("account_id", "1"),
                ("account_name", ACCOUNT_NAMES[0]),
                ("reference_date", "2024-12-01"),
                ("title", "Q4 2024 Sales Funnel"),
                ("description", "Sales funnel analysis for Q4 2024"),
                ("leads", "1500"),
                ("qualified", "750"),
                ("proposals", "300"),
                ("closed", "150"),
                ("conversion_rate", "10%"),
            ]),
            sections: vec![
                fixed_section(LetterGrade::A, 460, "Strong results"),
                fixed_section(LetterGrade::BPlus, 390, "Good progress"),
            ],
        },
        ReportCard {
            id: 2,
            uuid: "8a91d5f2-7c3e-4b60-a1f4-0e2b6d9c7a52".to_string(),
            card_type: QUICKBOOKS_CORE.to_string(),
            parameters: params(&[
                ("account_id", "2"),
                ("account_name", ACCOUNT_NAMES[1]),
                ("reference_date", "2024-11-01"),
                ("title", "November 2024 Financial Summary"),
                ("description", "QuickBooks financial summary for November 2024"),
                ("revenue", "$125,000"),
                ("expenses", "$85,000"),
                ("profit", "$40,000"),
                ("accounts_receivable", "$35,000"),
                ("accounts_payable", "$15,000"),
            ]),
            sections: vec![
                fixed_section(LetterGrade::B, 340, "Meets standards"),
                fixed_section(LetterGrade::CPlus, 270, "Room for growth"),
            ],
        },
        ReportCard {
            id: 3,
            uuid: "c2e47b10-95d8-4f3a-8e6c-1b7a4f02d9e3".to_string(),
            card_type: CUSTOM_AGENCY.to_string(),
            parameters: params(&[
                ("account_id", "3"),
                ("account_name", ACCOUNT_NAMES[2]),
                ("reference_date", "2024-12-01"),
                ("title", "Digital Marketing Campaign Performance"),
                ("description", "Custom agency report for digital marketing campaigns"),
                ("campaign_name", "Holiday Season 2024"),
                ("impressions", "2.5M"),
                ("clicks", "125K"),
                ("conversions", "5,000"),
                ("cost_per_conversion", "$15.50"),
                ("roi", "250%"),
            ]),
            sections: vec![
                fixed_section(LetterGrade::APlus, 490, "Exceeds expectations"),
                fixed_section(LetterGrade::D, 180, "Requires attention"),
            ],
        },
    ]
}

// ============================================================================
// Monthly Account Dataset
// ============================================================================

fn account_card<R: Rng + ?Sized>(
    rng: &mut R,
    id: u64,
    account_id: usize,
    account_name: &str,
    reference_date: &str,
    card_type: &str,
) -> ReportCard {
    let account_id = account_id.to_string();
    ReportCard {
        id,
        uuid: random_key(rng),
        card_type: card_type.to_string(),
        parameters: params(&[
            ("account_id", account_id.as_str()),
            ("account_name", account_name),
            ("reference_date", reference_date),
        ]),
        sections: random_sections(rng),
    }
}

/// Cards for every account and month in `months`
///
/// Each account always gets a Funnel card; QuickBooks Core and Custom Agency
/// cards are each added with probability [`OPTIONAL_CARD_PROBABILITY`].
/// Ids are sequential from 1 in generation order.
pub fn generate_dataset<R: Rng + ?Sized>(rng: &mut R, months: &[NaiveDate]) -> Vec<ReportCard> {
    let mut cards = Vec::new();
    let mut next_id = 1u64;

    for month in months {
        let reference_date = month.format("%Y-%m-%d").to_string();

        for (index, account_name) in ACCOUNT_NAMES.iter().enumerate() {
            let account_id = index + 1;
            let mut push = |rng: &mut R, card_type: &str| {
                cards.push(account_card(rng, next_id, account_id, account_name, &reference_date, card_type));
                next_id += 1;
            };

            push(rng, FUNNEL);
            if rng.gen_bool(OPTIONAL_CARD_PROBABILITY) {
                push(rng, QUICKBOOKS_CORE);
            }
            if rng.gen_bool(OPTIONAL_CARD_PROBABILITY) {
                push(rng, CUSTOM_AGENCY);
            }
        }
    }

    tracing::debug!("Generated {} report cards over {} months", cards.len(), months.len());
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_scores_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2_000 {
            let score = random_score(&mut rng).value();
            assert!((1.0..=5.0).contains(&score), "score {} out of range", score);
            assert_relative_eq!(score, (score * 100.0).round() / 100.0);
        }
    }

    #[test]
    fn test_random_sections_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let sections = random_sections(&mut rng);
        assert_eq!(sections.len(), 2);
        for section in sections {
            assert!(COMMENT_PHRASES.contains(&section.comment.as_str()));
        }
    }

    #[test]
    fn test_random_key_is_v4_uuid() {
        let mut rng = StdRng::seed_from_u64(1);
        let key = random_key(&mut rng);
        let parsed = uuid::Uuid::parse_str(&key).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(key, random_key(&mut rng));
    }

    #[test]
    fn test_sample_cards_are_displayable() {
        let registry = TypeRegistry::new();
        let cards = sample_cards();
        assert_eq!(cards.len(), 3);
        for card in &cards {
            assert!(registry.validate(&card.card_type, &card.parameters), "{} invalid", card.card_type);
        }
    }

    #[test]
    fn test_dataset_always_has_funnel_cards() {
        let mut rng = StdRng::seed_from_u64(42);
        let months = dataset_months();
        let cards = generate_dataset(&mut rng, &months);

        let funnel = cards.iter().filter(|c| c.card_type == FUNNEL).count();
        assert_eq!(funnel, ACCOUNT_NAMES.len() * months.len());
        assert!(cards.len() >= funnel && cards.len() <= funnel * 3);

        let ids: Vec<u64> = cards.iter().map(|c| c.id).collect();
        let expected: Vec<u64> = (1..=cards.len() as u64).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_dataset_is_reproducible_with_seed() {
        let months = dataset_months();
        let a = generate_dataset(&mut StdRng::seed_from_u64(9), &months);
        let b = generate_dataset(&mut StdRng::seed_from_u64(9), &months);
        assert_eq!(a, b);
    }

    #[test]
    fn test_dataset_months() {
        let months = dataset_months();
        assert_eq!(months.len(), 10);
        assert_eq!(months[0].to_string(), "2025-01-01");
        assert_eq!(months[9].to_string(), "2025-10-01");
    }
}
