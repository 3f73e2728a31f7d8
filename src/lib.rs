//! Fitvoice - voice-command input for a fitness tracker
//!
//! Transcripts come from a fallback chain of speech sources (external
//! engine, platform recognizer, offline simulation); a phrase-matching
//! dispatcher maps each one to at most one application action.

/// Configuration management
pub mod config;
/// Command dispatch: built-ins, complex tasks, automation sequences
pub mod dispatch;
/// Feedback sinks for dispatcher output
pub mod feedback;
/// Speech source adapter and fallback chain
pub mod recognizer;
/// Telemetry and logging
pub mod telemetry;
