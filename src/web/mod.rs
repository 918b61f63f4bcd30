//! HTML presentation layer
//!
//! - `handlers/`: Axum page handlers backed by Askama templates
//! - `view_models`: display-ready structs the templates render

pub mod handlers;
pub mod view_models;
