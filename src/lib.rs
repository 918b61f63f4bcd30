//! Report Card Server
//!
//! List/detail web interface over a small report card store.
//!
//! - `registry/`: type tag -> required parameter names, display validation
//! - `model/`: report card, section, letter grade and score types
//! - `repository/`: in-memory and JSON-file backing stores
//! - `generator/`: random sections, preseeded cards, monthly account dataset
//! - `audit/`: checks a generated dataset against its promised shape
//! - `api_server` + `web/`: Axum router, HTML pages and JSON endpoints (feature `api`)
//!
//! Cards are created permissively and validated only when displayed.

pub mod audit;
pub mod config;
pub mod generator;
pub mod model;
pub mod registry;
pub mod repository;

#[cfg(feature = "api")]
pub mod api_server;
#[cfg(feature = "api")]
pub mod web;

// Re-export commonly used types
pub use config::{ServerConfig, StoreKind};
pub use model::{LetterGrade, ReportCard, Score, Section};
pub use registry::{TypeRegistry, Unrenderable};
pub use repository::{CardFilter, InMemoryRepository, JsonFileRepository, ReportCardRepository, StoreError};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
