//! View models for the HTML pages
//!
//! Templates only see pre-formatted strings; all number formatting and
//! colour banding happens here.

use crate::model::{ReportCard, Section};
use crate::registry::{ReportCardKind, TypeRegistry};

/// Scores at or above this get a dark background and white text
pub const DARK_GREEN_THRESHOLD: f64 = 4.25;

/// Background colour band for a section score
pub fn score_background_color(score: f64) -> &'static str {
    match score {
        s if (1.0..2.0).contains(&s) => "#ff4444",
        s if (2.0..3.0).contains(&s) => "#ff9933",
        s if (3.0..3.75).contains(&s) => "#ffff66",
        s if (3.75..DARK_GREEN_THRESHOLD).contains(&s) => "#90ee90",
        s if (DARK_GREEN_THRESHOLD..=5.0).contains(&s) => "#228b22",
        _ => "",
    }
}

pub fn score_text_color(score: f64) -> &'static str {
    if score >= DARK_GREEN_THRESHOLD {
        "#ffffff"
    } else {
        "#000000"
    }
}

#[derive(Debug, Clone)]
pub struct SectionView {
    pub grade: String,
    pub score: String,
    pub comment: String,
    pub background: &'static str,
    pub text_color: &'static str,
}

impl From<&Section> for SectionView {
    fn from(section: &Section) -> Self {
        let score = section.score.value();
        Self {
            grade: section.grade.to_string(),
            score: section.score.to_string(),
            comment: section.comment.clone(),
            background: score_background_color(score),
            text_color: score_text_color(score),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParameterView {
    pub name: String,
    pub value: String,
}

/// One row of the index page
#[derive(Debug, Clone)]
pub struct CardSummary {
    pub uuid: String,
    pub type_name: String,
    pub headline: String,
    pub reference_date: String,
    pub average_score: String,
    pub sections: Vec<SectionView>,
}

impl CardSummary {
    pub fn new(card: &ReportCard, registry: &TypeRegistry) -> Self {
        Self {
            uuid: card.uuid.clone(),
            type_name: type_name(card, registry),
            headline: headline(card),
            reference_date: card.reference_date().unwrap_or("").to_string(),
            average_score: card.average_score().map(|s| format!("{:.2}", s)).unwrap_or_default(),
            sections: card.sections.iter().map(SectionView::from).collect(),
        }
    }
}

/// Full detail view of one card
#[derive(Debug, Clone)]
pub struct CardDetail {
    pub id: u64,
    pub uuid: String,
    pub type_name: String,
    pub headline: String,
    pub parameters: Vec<ParameterView>,
    pub sections: Vec<SectionView>,
}

impl CardDetail {
    pub fn new(card: &ReportCard, registry: &TypeRegistry) -> Self {
        Self {
            id: card.id,
            uuid: card.uuid.clone(),
            type_name: type_name(card, registry),
            headline: headline(card),
            parameters: card
                .parameters
                .iter()
                .map(|(name, value)| ParameterView { name: name.clone(), value: value.clone() })
                .collect(),
            sections: card.sections.iter().map(SectionView::from).collect(),
        }
    }
}

/// `<option>` entry for a select box
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: &str, label: &str, current: Option<&str>) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected: current == Some(value),
        }
    }
}

/// A registered type as shown on the create form
#[derive(Debug, Clone)]
pub struct KindView {
    pub tag: String,
    pub display_name: String,
    pub required: String,
}

impl From<&ReportCardKind> for KindView {
    fn from(kind: &ReportCardKind) -> Self {
        Self {
            tag: kind.tag.to_string(),
            display_name: kind.display_name.to_string(),
            required: kind.required.join(", "),
        }
    }
}

/// Every distinct required parameter across the registry, first-seen order
pub fn form_fields(registry: &TypeRegistry) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for kind in registry.kinds() {
        for name in kind.required {
            if !fields.iter().any(|f| f == name) {
                fields.push(name.to_string());
            }
        }
    }
    fields
}

fn type_name(card: &ReportCard, registry: &TypeRegistry) -> String {
    registry
        .display_name(&card.card_type)
        .map(str::to_string)
        .unwrap_or_else(|| card.card_type.clone())
}

/// Best human label for a card: title, a person/course/account name, or the uuid
fn headline(card: &ReportCard) -> String {
    ["title", "student_name", "teacher_name", "course_name", "account_name"]
        .iter()
        .filter_map(|key| card.parameter(key))
        .find(|value| !value.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| card.uuid.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_colour_bands() {
        assert_eq!(score_background_color(1.0), "#ff4444");
        assert_eq!(score_background_color(1.99), "#ff4444");
        assert_eq!(score_background_color(2.0), "#ff9933");
        assert_eq!(score_background_color(3.5), "#ffff66");
        assert_eq!(score_background_color(3.75), "#90ee90");
        assert_eq!(score_background_color(4.24), "#90ee90");
        assert_eq!(score_background_color(4.25), "#228b22");
        assert_eq!(score_background_color(5.0), "#228b22");
        assert_eq!(score_background_color(0.5), "");
    }

    #[test]
    fn test_text_colour_flips_on_dark_green() {
        assert_eq!(score_text_color(4.24), "#000000");
        assert_eq!(score_text_color(4.25), "#ffffff");
    }

    #[test]
    fn test_form_fields_are_unique() {
        let fields = form_fields(&TypeRegistry::new());
        assert_eq!(fields[0], "account_id");
        assert_eq!(fields.iter().filter(|f| *f == "reference_date").count(), 1);
        assert!(fields.contains(&"account_name".to_string()));
    }

    #[test]
    fn test_headline_prefers_title() {
        let registry = TypeRegistry::new();
        let cards = crate::generator::sample_cards();
        let summary = CardSummary::new(&cards[0], &registry);
        assert_eq!(summary.headline, "Q4 2024 Sales Funnel");
        assert_eq!(summary.type_name, "Funnel Report Card");
        assert_eq!(summary.sections.len(), 2);
        assert_eq!(summary.sections[0].score, "4.60");
    }
}
