//! Pantry tracking and AI recipe generation.
//!
//! [`PantryService`] owns the database handle and hands out the ingredient and
//! recipe stores. Generation and report submission go through the
//! [`generation::RecipeGenerator`] and [`report::ReportEndpoint`] traits so the
//! network clients live with the caller.

pub mod db;
pub mod error;
pub mod generation;
pub mod models;
pub mod prompt;
pub mod report;
pub mod scope;
pub mod service;
pub mod store;

pub use error::{Error, ReportError, Result};
pub use service::PantryService;
