//! Data models for the `Skycast` assistant
//!
//! This module contains the core domain models organized by concern:
//! - Conversation: chat turns and classified query intent
//! - Location: geocoded place data
//! - Weather: the normalized weather record handed to the UI

pub mod conversation;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use conversation::{ConversationTurn, QueryIntent, Role};
pub use location::Location;
pub use weather::{ForecastDay, NormalizedWeather};
