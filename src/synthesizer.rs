//! Response synthesis
//!
//! Turns a normalized weather record into natural language grounded strictly
//! in the fetched fields. Model failures fall back to a deterministic
//! templated summary so the user always receives a usable answer.

use std::sync::Arc;

use tracing::warn;

use crate::llm::{ChatMessage, ChatModel};
use crate::models::{ConversationTurn, NormalizedWeather, QueryIntent, Role};

const GENERIC_PROMPT: &str = "You are a friendly weather assistant chatting with a user. \
Reply briefly and helpfully to the latest message. If the user seems to want \
weather information, invite them to name a city.";

const GENERIC_FALLBACK: &str = "I'm best at answering weather questions. Ask me about \
the current conditions or the forecast in any city.";

/// Produces the assistant's reply text from classified intent and fetched
/// weather data
pub struct ResponseSynthesizer {
    model: Arc<dyn ChatModel>,
}

impl ResponseSynthesizer {
    #[must_use]
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Produce a reply grounded in the fetched record
    ///
    /// Infallible to the caller: a failed or empty model completion degrades
    /// to [`fallback_summary`].
    pub async fn synthesize(
        &self,
        history: &[ConversationTurn],
        intent: QueryIntent,
        weather: &NormalizedWeather,
    ) -> String {
        let system = grounding_prompt(intent, weather);
        let messages = to_chat_messages(history);

        match self.model.complete(&system, &messages).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback_summary(intent, weather),
            Err(err) => {
                warn!("Reply synthesis failed, using templated summary: {err:#}");
                fallback_summary(intent, weather)
            }
        }
    }

    /// Conversational reply for turns that are not weather requests
    pub async fn generic_reply(&self, history: &[ConversationTurn]) -> String {
        let messages = to_chat_messages(history);

        match self.model.complete(GENERIC_PROMPT, &messages).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => GENERIC_FALLBACK.to_string(),
            Err(err) => {
                warn!("Generic reply failed, using canned fallback: {err:#}");
                GENERIC_FALLBACK.to_string()
            }
        }
    }
}

/// System prompt embedding the fetched record verbatim
///
/// The model is instructed to answer only from these facts; it may not invent
/// data the gateway did not return.
fn grounding_prompt(intent: QueryIntent, weather: &NormalizedWeather) -> String {
    let mut facts = format!(
        "City: {}\nConditions: {}\nTemperature: {}°C (feels like {}°C)\n\
         Humidity: {}%\nWind: {:.1} m/s\nSunrise: {}\nSunset: {}\n",
        weather.city,
        weather.description,
        weather.temperature,
        weather.feels_like,
        weather.humidity,
        weather.wind_speed,
        weather.sunrise,
        weather.sunset,
    );

    if let Some(forecast) = &weather.forecast {
        facts.push_str("Daily forecast:\n");
        for day in forecast {
            facts.push_str(&format!(
                "- {}: {}°C, {}\n",
                day.date.format("%A %B %-d"),
                day.temperature,
                day.description
            ));
        }
    }

    let emphasis = match intent {
        QueryIntent::Forecast => "Emphasize the day-by-day outlook.",
        QueryIntent::Mixed => "Cover both the current conditions and the outlook.",
        _ => "Emphasize the present conditions.",
    };

    format!(
        "You are a weather assistant. Answer the user's latest question using ONLY \
         the weather data below. Do not invent numbers or conditions that are not \
         listed. Mention the city by name and answer the literal question asked. \
         {emphasis}\n\n{facts}"
    )
}

/// Deterministic templated summary built directly from the record's fields
fn fallback_summary(intent: QueryIntent, weather: &NormalizedWeather) -> String {
    let mut reply = format!(
        "It's currently {} with {} in {}, feeling like {}°C. Humidity is at {}% \
         with winds of {}. The sun rose at {} and will set at {}.",
        weather.format_temperature(),
        weather.description,
        weather.city,
        weather.feels_like,
        weather.humidity,
        weather.format_wind(),
        weather.sunrise,
        weather.sunset,
    );

    if intent.wants_forecast()
        && let Some(forecast) = &weather.forecast
        && !forecast.is_empty()
    {
        reply.push_str(&format!("\n\nHere's the outlook for {}:", weather.city));
        for day in forecast {
            reply.push_str(&format!(
                "\n{}: {}°C, {}",
                day.date.format("%A, %B %-d"),
                day.temperature,
                day.description
            ));
        }
    }

    reply
}

fn to_chat_messages(history: &[ConversationTurn]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::User => ChatMessage::user(turn.content.clone()),
            Role::Assistant => ChatMessage::assistant(turn.content.clone()),
        })
        .collect()
}
