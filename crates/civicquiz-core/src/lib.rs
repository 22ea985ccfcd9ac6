//! civicquiz-core — Quiz session state machine, scoring, and runner.
//!
//! This crate defines the question/answer data model, the pure session
//! state machine, streak scoring, and the async runner that drives a
//! session against a countdown and reports results to a scoring service.

pub mod bank;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod scoring;
pub mod session;
pub mod traits;

pub use error::QuizError;
pub use session::{Phase, QuizSession};
