//! civicquiz-gamification — Remote scoring service integration.
//!
//! Implements the `ScoringService` trait against the gamification HTTP
//! endpoint, and loads the civicquiz configuration file.

pub mod client;
pub mod config;
pub mod error;
pub mod mock;

pub use client::GamificationClient;
pub use config::{create_scoring_service, load_config_from, CivicquizConfig, GamificationConfig};
pub use error::GamificationError;
