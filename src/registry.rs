//! Report Card Type Registry
//!
//! Maps a report card type tag to the parameter names a card of that type
//! must carry before it can be displayed.
//!
//! - School cards (`student`, `teacher`, `course`) are parameter-driven
//! - Account cards (`Funnel Report Card`, ...) are account/date-driven
//!
//! The table is fixed at process start. Validation only checks that every
//! required key is present; values are never inspected.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use thiserror::Error;

/// One registered report card type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportCardKind {
    pub tag: &'static str,
    pub display_name: &'static str,
    pub required: &'static [&'static str],
}

// ============================================================================
// EMBEDDED TYPE TABLE
// ============================================================================

pub const FUNNEL: &str = "Funnel Report Card";
pub const QUICKBOOKS_CORE: &str = "QuickBooks Core Report Card";
pub const CUSTOM_AGENCY: &str = "Custom Agency Report Card";

const ACCOUNT_PARAMETERS: &[&str] = &["account_id", "account_name", "reference_date"];

static KINDS: &[ReportCardKind] = &[
    ReportCardKind {
        tag: "student",
        display_name: "Student Report Card",
        required: &["account_id", "student_name", "reference_date"],
    },
    ReportCardKind {
        tag: "teacher",
        display_name: "Teacher Report Card",
        required: &["account_id", "teacher_name", "subject", "reference_date"],
    },
    ReportCardKind {
        tag: "course",
        display_name: "Course Report Card",
        required: &["account_id", "course_name", "course_code", "reference_date"],
    },
    ReportCardKind { tag: FUNNEL, display_name: FUNNEL, required: ACCOUNT_PARAMETERS },
    ReportCardKind { tag: QUICKBOOKS_CORE, display_name: QUICKBOOKS_CORE, required: ACCOUNT_PARAMETERS },
    ReportCardKind { tag: CUSTOM_AGENCY, display_name: CUSTOM_AGENCY, required: ACCOUNT_PARAMETERS },
];

/// Why a stored card cannot be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unrenderable {
    #[error("unsupported report card type '{0}'")]
    UnknownType(String),

    #[error("report card type '{tag}' is missing parameters: {}", .missing.join(", "))]
    MissingParameters { tag: String, missing: Vec<String> },
}

/// Lookup table from type tag to its metadata
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    kinds: FxHashMap<&'static str, ReportCardKind>,
    order: Vec<&'static str>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Build the registry from the embedded type table
    pub fn new() -> Self {
        let mut kinds = FxHashMap::default();
        let mut order = Vec::with_capacity(KINDS.len());
        for kind in KINDS {
            kinds.insert(kind.tag, *kind);
            order.push(kind.tag);
        }
        Self { kinds, order }
    }

    /// Registered tags in table order
    pub fn tags(&self) -> &[&'static str] {
        &self.order
    }

    pub fn kind(&self, tag: &str) -> Option<&ReportCardKind> {
        self.kinds.get(tag)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ReportCardKind> + '_ {
        self.order.iter().filter_map(move |tag| self.kinds.get(tag))
    }

    pub fn display_name(&self, tag: &str) -> Option<&'static str> {
        self.kind(tag).map(|k| k.display_name)
    }

    /// Required parameter names for a tag, or `None` for an unknown tag
    pub fn required_parameters(&self, tag: &str) -> Option<&'static [&'static str]> {
        self.kind(tag).map(|k| k.required)
    }

    /// True iff the tag is known and every required name is a key of `parameters`
    pub fn validate(&self, tag: &str, parameters: &BTreeMap<String, String>) -> bool {
        self.check(tag, parameters).is_ok()
    }

    /// Same as [`validate`](Self::validate) but reports which check failed
    pub fn check(&self, tag: &str, parameters: &BTreeMap<String, String>) -> Result<(), Unrenderable> {
        let required = self
            .required_parameters(tag)
            .ok_or_else(|| Unrenderable::UnknownType(tag.to_string()))?;

        let missing: Vec<String> = required
            .iter()
            .filter(|name| !parameters.contains_key(**name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Unrenderable::MissingParameters { tag: tag.to_string(), missing })
        }
    }
}
