//! Report Card Repository
//!
//! Two backing stores behind one trait:
//! - `InMemoryRepository`: a locked `Vec`, optionally preseeded with sample cards
//! - `JsonFileRepository`: a JSON file rewritten in full on every write
//!
//! Lookups are linear scans. Callers always get owned copies.
//!
//! The file store takes no lock across its read-modify-write cycle. Two
//! concurrent `create` calls can both read the same snapshot and the later
//! write wins, dropping the other card. The store targets a single admin
//! writer and accepts that limitation.

use crate::model::{ReportCard, Section};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

pub const DEFAULT_STORAGE_FILE: &str = "data/report_cards.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read report cards from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed report card file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write report cards to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report cards: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ============================================================================
// Filtering
// ============================================================================

/// Exact-match filter over card type and well-known parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub card_type: Option<String>,
    pub account_id: Option<String>,
    pub reference_date: Option<String>,
}

impl CardFilter {
    pub fn is_empty(&self) -> bool {
        self.card_type.is_none() && self.account_id.is_none() && self.reference_date.is_none()
    }

    pub fn matches(&self, card: &ReportCard) -> bool {
        fn field_matches(wanted: &Option<String>, actual: Option<&str>) -> bool {
            match wanted {
                Some(w) => actual == Some(w.as_str()),
                None => true,
            }
        }

        field_matches(&self.card_type, Some(card.card_type.as_str()))
            && field_matches(&self.account_id, card.account_id())
            && field_matches(&self.reference_date, card.reference_date())
    }
}

// ============================================================================
// Repository Trait
// ============================================================================

pub trait ReportCardRepository: Send + Sync {
    /// Every stored card in insertion order
    fn all(&self) -> Vec<ReportCard>;

    /// Assign the next id and a fresh uuid, append, persist
    ///
    /// No parameter validation happens here; a card missing required
    /// parameters is stored and only rejected when displayed.
    fn create(
        &self,
        card_type: &str,
        parameters: BTreeMap<String, String>,
        sections: Vec<Section>,
    ) -> Result<ReportCard, StoreError>;

    /// Append `card` unless a card with the same identity is already stored
    ///
    /// Returns whether the card was appended.
    fn add(&self, card: ReportCard) -> Result<bool, StoreError>;

    fn get_by_id(&self, id: u64) -> Option<ReportCard> {
        self.all().into_iter().find(|c| c.id == id)
    }

    /// First card whose public key matches
    fn get_by_uuid(&self, uuid: &str) -> Option<ReportCard> {
        self.all().into_iter().find(|c| c.uuid == uuid)
    }

    fn filter(&self, filter: &CardFilter) -> Vec<ReportCard> {
        self.all().into_iter().filter(|c| filter.matches(c)).collect()
    }

    /// Distinct reference dates, newest first
    fn reference_dates(&self) -> Vec<String> {
        let dates: BTreeSet<String> = self
            .all()
            .iter()
            .filter_map(|c| c.reference_date().map(str::to_string))
            .collect();
        dates.into_iter().rev().collect()
    }
}

/// Max existing id + 1, or 1 for an empty store
pub fn next_id(cards: &[ReportCard]) -> u64 {
    cards.iter().map(|c| c.id).max().map_or(1, |max| max + 1)
}

/// 128-bit random public key
pub fn new_external_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn build_card(
    cards: &[ReportCard],
    card_type: &str,
    parameters: BTreeMap<String, String>,
    sections: Vec<Section>,
) -> ReportCard {
    ReportCard {
        id: next_id(cards),
        uuid: new_external_key(),
        card_type: card_type.to_string(),
        parameters,
        sections,
    }
}

// ============================================================================
// In-Memory Repository
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    cards: RwLock<Vec<ReportCard>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: Vec<ReportCard>) -> Self {
        Self { cards: RwLock::new(cards) }
    }

    /// Preseeded with one sample card per account card type
    pub fn with_sample_data() -> Self {
        Self::with_cards(crate::generator::sample_cards())
    }
}

impl ReportCardRepository for InMemoryRepository {
    fn all(&self) -> Vec<ReportCard> {
        // A poisoned lock still holds a consistent Vec; every write is a single push.
        match self.cards.read() {
            Ok(cards) => cards.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn create(
        &self,
        card_type: &str,
        parameters: BTreeMap<String, String>,
        sections: Vec<Section>,
    ) -> Result<ReportCard, StoreError> {
        let mut cards = self.cards.write().unwrap_or_else(|p| p.into_inner());
        let card = build_card(&cards, card_type, parameters, sections);
        cards.push(card.clone());
        tracing::debug!("Created report card {} ({})", card.id, card.uuid);
        Ok(card)
    }

    fn add(&self, card: ReportCard) -> Result<bool, StoreError> {
        let mut cards = self.cards.write().unwrap_or_else(|p| p.into_inner());
        if cards.iter().any(|c| c.same_identity(&card)) {
            return Ok(false);
        }
        cards.push(card);
        Ok(true)
    }
}

// ============================================================================
// JSON File Repository
// ============================================================================

/// Accepted on-disk layouts: a bare array, or the generated-dataset envelope
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum StoredCards {
    List(Vec<ReportCard>),
    Envelope { report_cards: Vec<ReportCard> },
}

#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl Default for JsonFileRepository {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_FILE)
    }
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole file, reporting why it could not be read
    pub fn load_strict(&self) -> Result<Vec<ReportCard>, StoreError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        match serde_json::from_str::<StoredCards>(&contents) {
            Ok(StoredCards::List(cards)) | Ok(StoredCards::Envelope { report_cards: cards }) => Ok(cards),
            Err(source) => Err(StoreError::Parse { path: self.path.clone(), source }),
        }
    }

    /// Load the whole file; a missing or malformed file reads as empty
    fn load(&self) -> Vec<ReportCard> {
        match self.load_strict() {
            Ok(cards) => cards,
            Err(StoreError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Storage file {} does not exist yet", self.path.display());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Treating storage as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Overwrite the whole file with `cards`
    fn save(&self, cards: &[ReportCard]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(cards)?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        Ok(())
    }
}

impl ReportCardRepository for JsonFileRepository {
    fn all(&self) -> Vec<ReportCard> {
        self.load()
    }

    fn create(
        &self,
        card_type: &str,
        parameters: BTreeMap<String, String>,
        sections: Vec<Section>,
    ) -> Result<ReportCard, StoreError> {
        let mut cards = self.load();
        let card = build_card(&cards, card_type, parameters, sections);
        cards.push(card.clone());
        self.save(&cards)?;
        tracing::info!(
            "Created report card {} ({}) in {}",
            card.id,
            card.uuid,
            self.path.display()
        );
        Ok(card)
    }

    fn add(&self, card: ReportCard) -> Result<bool, StoreError> {
        let mut cards = self.load();
        if cards.iter().any(|c| c.same_identity(&card)) {
            return Ok(false);
        }
        cards.push(card);
        self.save(&cards)?;
        Ok(true)
    }
}
