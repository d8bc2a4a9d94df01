//! `Skycast` - conversational weather assistant backend
//!
//! This library provides the chat-turn orchestration pipeline: intent
//! classification, geocoding + weather fetching, and grounded reply
//! synthesis, plus the HTTP surface the browser UI talks to.

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod orchestrator;
pub mod synthesizer;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use classifier::{Classification, IntentClassifier};
pub use config::AppConfig;
pub use error::SkycastError;
pub use llm::{ChatMessage, ChatModel, OpenAiChat};
pub use models::{ConversationTurn, ForecastDay, Location, NormalizedWeather, QueryIntent, Role};
pub use orchestrator::{OrchestrationResult, TurnOrchestrator};
pub use synthesizer::ResponseSynthesizer;
pub use weather::{OpenWeatherGateway, WeatherGateway};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
