//! Report Card Entity
//!
//! Canonical on-disk schema:
//!
//! ```json
//! { "id": 1, "uuid": "...", "card_type": "student",
//!   "parameters": { "account_id": "ACC001" },
//!   "sections": [ { "grade": "A", "score": 4.5, "comment": "..." } ] }
//! ```
//!
//! Older files used `report_card_type` for the type tag and `letter_grade`
//! for the section grade. Both are accepted on read and always written back
//! under the canonical names.
//!
//! Generated datasets also carry `account_id`, `account_name` and
//! `reference_date` at the top level of each record. Those keys are folded
//! into `parameters` on read (numbers become their decimal string) and are
//! written back inside `parameters`. A key already present in `parameters`
//! wins over its top-level twin.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

const MIN_HUNDREDTHS: u16 = 100;
const MAX_HUNDREDTHS: u16 = 500;

// ============================================================================
// Letter Grade
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 11] = [
        LetterGrade::APlus,
        LetterGrade::A,
        LetterGrade::AMinus,
        LetterGrade::BPlus,
        LetterGrade::B,
        LetterGrade::BMinus,
        LetterGrade::CPlus,
        LetterGrade::C,
        LetterGrade::CMinus,
        LetterGrade::D,
        LetterGrade::F,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// Score
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("score must be a finite number, got {0}")]
    NotFinite(f64),

    #[error("score {0} is outside [1.00, 5.00]")]
    OutOfRange(f64),
}

/// Section score in [1.00, 5.00], held at two decimal places
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub const MIN: Score = Score(MIN_SCORE);
    pub const MAX: Score = Score(MAX_SCORE);

    pub fn new(value: f64) -> Result<Self, ScoreError> {
        if !value.is_finite() {
            return Err(ScoreError::NotFinite(value));
        }
        let rounded = round2(value);
        if !(MIN_SCORE..=MAX_SCORE).contains(&rounded) {
            return Err(ScoreError::OutOfRange(value));
        }
        Ok(Score(rounded))
    }

    /// Exact two-decimal score from whole hundredths, clamped into range
    pub fn from_hundredths(hundredths: u16) -> Self {
        let clamped = hundredths.clamp(MIN_HUNDREDTHS, MAX_HUNDREDTHS);
        Score(f64::from(clamped) / 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = ScoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> f64 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Section and Report Card
// ============================================================================

/// One graded component of a report card
///
/// Grade and score are independent; nothing ties a letter to a score band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(alias = "letter_grade")]
    pub grade: LetterGrade,
    pub score: Score,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReportCard")]
pub struct ReportCard {
    pub id: u64,
    /// Public lookup key, distinct from `id`
    pub uuid: String,
    pub card_type: String,
    pub parameters: BTreeMap<String, String>,
    pub sections: Vec<Section>,
}

/// Top-level record keys that belong in `parameters`
pub const LEGACY_PARAMETER_KEYS: [&str; 3] = ["account_id", "account_name", "reference_date"];

/// On-disk record as read, before legacy keys are folded in
#[derive(Deserialize)]
struct RawReportCard {
    id: u64,
    uuid: String,
    #[serde(default)]
    card_type: Option<String>,
    #[serde(default)]
    parameters: BTreeMap<String, String>,
    #[serde(default)]
    sections: Vec<Section>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<RawReportCard> for ReportCard {
    type Error = String;

    fn try_from(mut raw: RawReportCard) -> Result<Self, Self::Error> {
        let card_type = match raw.card_type {
            Some(tag) => tag,
            None => match raw.extra.remove("report_card_type") {
                Some(serde_json::Value::String(tag)) => tag,
                _ => return Err(format!("report card {} has no card_type", raw.id)),
            },
        };

        let mut parameters = raw.parameters;
        for (key, value) in raw.extra {
            if !LEGACY_PARAMETER_KEYS.contains(&key.as_str()) {
                continue;
            }
            let text = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            parameters.entry(key).or_insert(text);
        }

        Ok(ReportCard {
            id: raw.id,
            uuid: raw.uuid,
            card_type,
            parameters,
            sections: raw.sections,
        })
    }
}

impl ReportCard {
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(|s| s.as_str())
    }

    pub fn account_id(&self) -> Option<&str> {
        self.parameter("account_id")
    }

    pub fn reference_date(&self) -> Option<&str> {
        self.parameter("reference_date")
    }

    /// Two cards are the same record when both id and uuid match
    pub fn same_identity(&self, other: &ReportCard) -> bool {
        self.id == other.id && self.uuid == other.uuid
    }

    /// Mean section score, rounded to two decimals
    pub fn average_score(&self) -> Option<f64> {
        if self.sections.is_empty() {
            return None;
        }
        let total: f64 = self.sections.iter().map(|s| s.score.value()).sum();
        Some(round2(total / self.sections.len() as f64))
    }
}
