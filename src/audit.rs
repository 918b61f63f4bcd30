//! Dataset Audit
//!
//! Checks a generated account dataset against the shape it promises:
//! 1. Reference dates cover exactly 2025-01-01 .. 2025-10-01, monthly
//! 2. At least 10 distinct account ids and account names
//! 3. Exactly one Funnel card per account per month
//! 4. QuickBooks Core and Custom Agency cards each cover 30-70% of
//!    account-months (the generator draws them at 50%)

use crate::generator::dataset_months;
use crate::model::ReportCard;
use crate::registry::{CUSTOM_AGENCY, FUNNEL, QUICKBOOKS_CORE};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const MIN_ACCOUNTS: usize = 10;
pub const OPTIONAL_SHARE_RANGE: (f64, f64) = (30.0, 70.0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetAudit {
    pub total_cards: usize,
    pub checks: Vec<CheckResult>,
}

impl DatasetAudit {
    pub fn passed(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.passed)
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for DatasetAudit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Audited {} report cards", self.total_cards)?;
        for check in &self.checks {
            let mark = if check.passed { "✓" } else { "✗" };
            writeln!(f, "{} {}", mark, check.name)?;
            for line in &check.details {
                writeln!(f, "    {}", line)?;
            }
        }
        let verdict = if self.passed() { "ALL REQUIREMENTS MET" } else { "SOME REQUIREMENTS NOT MET" };
        write!(f, "{}", verdict)
    }
}

/// Run every check over `cards`
pub fn audit(cards: &[ReportCard]) -> DatasetAudit {
    if cards.is_empty() {
        return DatasetAudit {
            total_cards: 0,
            checks: vec![CheckResult {
                name: "non-empty dataset",
                passed: false,
                details: vec!["no report cards found".to_string()],
            }],
        };
    }

    let expected_dates: Vec<String> = dataset_months()
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    let account_ids: BTreeSet<&str> = cards.iter().filter_map(|c| c.account_id()).collect();

    DatasetAudit {
        total_cards: cards.len(),
        checks: vec![
            check_date_range(cards, &expected_dates),
            check_accounts(cards, &account_ids),
            check_funnel_coverage(cards, &expected_dates, &account_ids),
            check_optional_share(cards, expected_dates.len() * account_ids.len()),
        ],
    }
}

fn check_date_range(cards: &[ReportCard], expected: &[String]) -> CheckResult {
    let found: BTreeSet<&str> = cards.iter().filter_map(|c| c.reference_date()).collect();
    let expected_set: BTreeSet<&str> = expected.iter().map(|s| s.as_str()).collect();

    let missing: Vec<&str> = expected_set.difference(&found).copied().collect();
    let extra: Vec<&str> = found.difference(&expected_set).copied().collect();

    let mut details = vec![format!("expected {} months, found {}", expected.len(), found.len())];
    if !missing.is_empty() {
        details.push(format!("missing: {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        details.push(format!("extra: {}", extra.join(", ")));
    }

    CheckResult {
        name: "date range",
        passed: missing.is_empty() && extra.is_empty(),
        details,
    }
}

fn check_accounts(cards: &[ReportCard], account_ids: &BTreeSet<&str>) -> CheckResult {
    let account_names: BTreeSet<&str> = cards.iter().filter_map(|c| c.parameter("account_name")).collect();

    CheckResult {
        name: "accounts",
        passed: account_ids.len() >= MIN_ACCOUNTS && account_names.len() >= MIN_ACCOUNTS,
        details: vec![
            format!("unique account ids: {}", account_ids.len()),
            format!("unique account names: {}", account_names.len()),
        ],
    }
}

fn check_funnel_coverage(
    cards: &[ReportCard],
    expected_dates: &[String],
    account_ids: &BTreeSet<&str>,
) -> CheckResult {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for card in cards.iter().filter(|c| c.card_type == FUNNEL) {
        if let (Some(account), Some(date)) = (card.account_id(), card.reference_date()) {
            *counts.entry((account, date)).or_default() += 1;
        }
    }

    let mut details = Vec::new();
    for date in expected_dates {
        for account in account_ids {
            let count = counts.get(&(*account, date.as_str())).copied().unwrap_or(0);
            if count != 1 {
                details.push(format!(
                    "account {} in {}: {} Funnel cards (expected 1)",
                    account, date, count
                ));
            }
        }
    }

    let passed = details.is_empty();
    if passed {
        details.push(format!(
            "{} accounts x {} months, one Funnel card each",
            account_ids.len(),
            expected_dates.len()
        ));
    }

    CheckResult { name: "funnel coverage", passed, details }
}

fn check_optional_share(cards: &[ReportCard], max_possible: usize) -> CheckResult {
    let (low, high) = OPTIONAL_SHARE_RANGE;
    let mut passed = max_possible > 0;
    let mut details = vec![format!("maximum possible (accounts x months): {}", max_possible)];

    for card_type in [QUICKBOOKS_CORE, CUSTOM_AGENCY] {
        let count = cards.iter().filter(|c| c.card_type == card_type).count();
        let share = if max_possible == 0 { 0.0 } else { count as f64 / max_possible as f64 * 100.0 };
        let within = (low..=high).contains(&share);
        passed &= within;
        details.push(format!("{}: {} ({:.1}%)", card_type, count, share));
    }

    CheckResult { name: "optional card share", passed, details }
}
