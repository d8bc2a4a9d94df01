//! Conversation turns and classified query intent

use serde::{Deserialize, Serialize};

/// Who authored a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the running conversation
///
/// The calling chat session owns the ordered turn list; the pipeline only
/// reads it and never mutates past entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    /// Create a user turn
    #[must_use]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    #[must_use]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The classified purpose of a turn
///
/// `None` means the turn is not a weather request; the orchestrator must not
/// call the weather gateway in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    Current,
    Forecast,
    Mixed,
    None,
}

impl QueryIntent {
    /// Whether this turn asks for weather data at all
    #[must_use]
    pub fn is_weather(self) -> bool {
        !matches!(self, QueryIntent::None)
    }

    /// Whether the multi-day forecast feed is needed
    #[must_use]
    pub fn wants_forecast(self) -> bool {
        matches!(self, QueryIntent::Forecast | QueryIntent::Mixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_predicates() {
        assert!(QueryIntent::Current.is_weather());
        assert!(QueryIntent::Mixed.is_weather());
        assert!(!QueryIntent::None.is_weather());

        assert!(QueryIntent::Forecast.wants_forecast());
        assert!(QueryIntent::Mixed.wants_forecast());
        assert!(!QueryIntent::Current.wants_forecast());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let turn = ConversationTurn::user("hello");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"user\""));

        let parsed: ConversationTurn =
            serde_json::from_str("{\"role\":\"assistant\",\"content\":\"hi\"}").unwrap();
        assert_eq!(parsed.role, Role::Assistant);
    }
}
