//! Turn orchestration
//!
//! Sequences the pipeline for one conversation turn: classify → fetch →
//! synthesize → package. Strictly linear; every failure past classification
//! degrades to a textual reply with no weather payload, and nothing is
//! retained across turns beyond the caller-supplied history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::SkycastError;
use crate::classifier::IntentClassifier;
use crate::models::{ConversationTurn, NormalizedWeather, Role};
use crate::synthesizer::ResponseSynthesizer;
use crate::weather::WeatherGateway;

/// The packaged outcome of one turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// Assistant reply text
    pub reply_text: String,
    /// Present only when the turn was a weather query and the fetch succeeded
    pub weather: Option<NormalizedWeather>,
}

/// Top-level sequencer tying classification, fetching, and synthesis together
pub struct TurnOrchestrator {
    classifier: IntentClassifier,
    gateway: Arc<dyn WeatherGateway>,
    synthesizer: ResponseSynthesizer,
}

impl TurnOrchestrator {
    #[must_use]
    pub fn new(
        classifier: IntentClassifier,
        gateway: Arc<dyn WeatherGateway>,
        synthesizer: ResponseSynthesizer,
    ) -> Self {
        Self {
            classifier,
            gateway,
            synthesizer,
        }
    }

    /// Handle the latest turn of a conversation
    ///
    /// Errors only on a violated caller contract (empty history, or a last
    /// message not authored by the user); upstream failures never propagate.
    #[tracing::instrument(skip(self, history))]
    pub async fn handle_turn(
        &self,
        history: &[ConversationTurn],
    ) -> Result<OrchestrationResult, SkycastError> {
        let latest = history
            .last()
            .ok_or_else(|| SkycastError::validation("message list must not be empty"))?;
        if latest.role != Role::User {
            return Err(SkycastError::validation(
                "the last message must come from the user",
            ));
        }

        let classification = self.classifier.classify(history).await;

        let Some(location) = classification.location.filter(|_| classification.intent.is_weather())
        else {
            let reply_text = self.synthesizer.generic_reply(history).await;
            return Ok(OrchestrationResult {
                reply_text,
                weather: None,
            });
        };

        info!(
            "Weather turn: {:?} for {}",
            classification.intent, location
        );

        match self.gateway.fetch(&location, classification.intent).await {
            Ok(weather) => {
                let reply_text = self
                    .synthesizer
                    .synthesize(history, classification.intent, &weather)
                    .await;
                Ok(OrchestrationResult {
                    reply_text,
                    weather: Some(weather),
                })
            }
            Err(err) => {
                warn!("Weather fetch for {location} failed: {err}");
                Ok(OrchestrationResult {
                    reply_text: apology(&location, &err),
                    weather: None,
                })
            }
        }
    }
}

/// Friendly reply for a failed fetch, always naming the requested place
fn apology(location: &str, err: &SkycastError) -> String {
    match err {
        SkycastError::LocationNotFound { .. } => format!(
            "Sorry, I couldn't find \"{location}\" on the map. Could you double-check the name?"
        ),
        _ => format!(
            "Sorry, I couldn't get the weather for {location} right now. Please try again in a moment."
        ),
    }
}
