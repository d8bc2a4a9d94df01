//! Intent classification for conversation turns
//!
//! Decides whether the latest turn is a weather request, which place it
//! refers to (inheriting from earlier turns when omitted), and whether the
//! user wants current conditions, a forecast, or both. A lexical pre-filter
//! runs before any language-model call; only location extraction goes through
//! the model, and every failure there degrades to "not a weather query"
//! rather than an error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::{ChatMessage, ChatModel};
use crate::models::{ConversationTurn, QueryIntent, Role};

/// Weather-domain keywords used as the fast pre-filter
const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "forecast",
    "rain",
    "raining",
    "snow",
    "snowing",
    "sunny",
    "cloudy",
    "humidity",
    "humid",
    "wind",
    "windy",
    "storm",
    "sunshine",
    "drizzle",
    "hail",
    "fog",
    "umbrella",
    "hot",
    "cold",
    "warm",
    "degrees",
    "sunrise",
    "sunset",
];

/// Future-oriented phrases signalling a forecast request
const FORECAST_CUES: &[&str] = &[
    "tomorrow",
    "next week",
    "this week",
    "weekend",
    "forecast",
    "will it",
    "coming days",
    "next few days",
    "later",
];

/// Present-oriented phrases signalling a current-conditions request
const CURRENT_CUES: &[&str] = &["now", "currently", "right now", "today", "at the moment"];

/// Phrases asking for the full picture at once
const MIXED_CUES: &[&str] = &["full picture", "overview", "current and forecast"];

/// Short follow-up phrasings that continue an earlier weather thread
const FOLLOWUP_CUES: &[&str] = &[
    "what about",
    "how about",
    "and there",
    "over there",
    "tomorrow",
    "next week",
    "weekend",
    "later",
];

const LOCATION_PROMPT: &str = "You extract place names from chat messages. \
Reply with ONLY the place the message refers to, formatted as \"City, State\" \
for US locations or \"City, Country\" otherwise, with abbreviations expanded \
(St. becomes Saint, NYC becomes New York City, UK becomes United Kingdom). \
If the message names no place, reply with the single word: none";

/// Result of classifying the latest conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Resolved human-readable place name, when the turn (or an earlier one)
    /// names a location
    pub location: Option<String>,
    /// Classified purpose of the turn
    pub intent: QueryIntent,
}

impl Classification {
    fn none() -> Self {
        Self {
            location: None,
            intent: QueryIntent::None,
        }
    }
}

/// Classifies turns using lexical cues plus a chat-model port for location
/// extraction
pub struct IntentClassifier {
    model: Arc<dyn ChatModel>,
}

impl IntentClassifier {
    #[must_use]
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Classify the last turn of a conversation
    ///
    /// Never returns an error: ambiguous turns and model failures collapse to
    /// `None`/`None` so the caller can fall back to generic conversation.
    pub async fn classify(&self, history: &[ConversationTurn]) -> Classification {
        let Some((latest, earlier)) = history.split_last() else {
            return Classification::none();
        };

        let latest_has_cue = has_weather_cue(&latest.content);
        let continues_thread = has_followup_cue(&latest.content)
            && earlier.iter().any(|turn| has_weather_cue(&turn.content));

        if !latest_has_cue && !continues_thread {
            debug!("No weather cue in latest turn, skipping model call");
            return Classification::none();
        }

        let intent = resolve_intent(&latest.content);

        let mut location = self.extract_location(&latest.content).await;
        if location.is_none() {
            // The turn omitted the place ("what about tomorrow?"); inherit it
            // from the most recent prior user turn that named one.
            for turn in earlier
                .iter()
                .rev()
                .filter(|turn| turn.role == Role::User)
            {
                location = self.extract_location(&turn.content).await;
                if location.is_some() {
                    break;
                }
            }
        }

        match location {
            Some(place) => Classification {
                location: Some(expand_abbreviations(&place)),
                intent,
            },
            // A weather query without a place cannot be answered
            None => Classification::none(),
        }
    }

    async fn extract_location(&self, text: &str) -> Option<String> {
        let messages = [ChatMessage::user(text)];
        match self.model.complete(LOCATION_PROMPT, &messages).await {
            Ok(reply) => parse_location_reply(&reply),
            Err(err) => {
                warn!("Location extraction failed, treating as no location: {err:#}");
                None
            }
        }
    }
}

/// Whether the text contains any weather-domain keyword
#[must_use]
pub fn has_weather_cue(text: &str) -> bool {
    WEATHER_KEYWORDS
        .iter()
        .any(|keyword| contains_phrase(text, keyword))
}

fn has_followup_cue(text: &str) -> bool {
    FOLLOWUP_CUES
        .iter()
        .any(|phrase| contains_phrase(text, phrase))
}

/// Resolve the query type from temporal phrasing
///
/// Assumes the text already passed the weather pre-filter; a weather cue with
/// no temporal phrase resolves to current conditions.
#[must_use]
pub fn resolve_intent(text: &str) -> QueryIntent {
    if MIXED_CUES.iter().any(|phrase| contains_phrase(text, phrase)) {
        return QueryIntent::Mixed;
    }

    let future = FORECAST_CUES
        .iter()
        .any(|phrase| contains_phrase(text, phrase));
    let present = CURRENT_CUES
        .iter()
        .any(|phrase| contains_phrase(text, phrase));

    match (present, future) {
        (true, true) => QueryIntent::Mixed,
        (false, true) => QueryIntent::Forecast,
        _ => QueryIntent::Current,
    }
}

/// Word-boundary-aware phrase search ("now" must not match "snow")
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let padded = format!(" {} ", normalized.split_whitespace().collect::<Vec<_>>().join(" "));
    padded.contains(&format!(" {phrase} "))
}

fn parse_location_reply(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches(['"', '\'', '.']).trim();
    if cleaned.is_empty()
        || cleaned.eq_ignore_ascii_case("none")
        || cleaned.contains('\n')
        || cleaned.len() > 80
    {
        return None;
    }
    Some(cleaned.to_string())
}

/// Expand common place-name abbreviations the model may echo back
fn expand_abbreviations(place: &str) -> String {
    place
        .split_whitespace()
        .map(|token| {
            let (word, comma) = match token.strip_suffix(',') {
                Some(stripped) => (stripped, ","),
                None => (token, ""),
            };
            let expanded = match word {
                "St." | "St" => "Saint",
                "NYC" => "New York City",
                "UK" => "United Kingdom",
                "USA" => "United States",
                "LA" => "Los Angeles",
                "SF" => "San Francisco",
                other => other,
            };
            format!("{expanded}{comma}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub model that recognizes a fixed set of city names
    struct CityLookupModel {
        calls: AtomicUsize,
    }

    impl CityLookupModel {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatModel for CityLookupModel {
        async fn complete(&self, _system: &str, messages: &[ChatMessage]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            for city in ["Tokyo", "Paris", "Berlin"] {
                if text.contains(city) {
                    return Ok(city.to_string());
                }
            }
            Ok("none".to_string())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn complete(&self, _system: &str, _messages: &[ChatMessage]) -> Result<String> {
            Err(anyhow!("model unavailable"))
        }
    }

    #[rstest]
    #[case("What's the weather in Paris?", QueryIntent::Current)]
    #[case("what about tomorrow?", QueryIntent::Forecast)]
    #[case("Will it rain this weekend?", QueryIntent::Forecast)]
    #[case("Give me the full picture for Berlin", QueryIntent::Mixed)]
    #[case("Is it sunny right now, and will it rain tomorrow?", QueryIntent::Mixed)]
    #[case("How humid is it currently?", QueryIntent::Current)]
    fn test_resolve_intent(#[case] text: &str, #[case] expected: QueryIntent) {
        assert_eq!(resolve_intent(text), expected);
    }

    #[rstest]
    #[case("thanks!", false)]
    #[case("lol", false)]
    #[case("what's 2+2?", false)]
    #[case("is it sunny in Madrid?", true)]
    #[case("any snow expected?", true)]
    // "now" alone is temporal, not a weather cue, and must not match "snow"
    #[case("I know what you mean", false)]
    fn test_has_weather_cue(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(has_weather_cue(text), expected);
    }

    #[rstest]
    #[case("St. Louis", "Saint Louis")]
    #[case("NYC", "New York City")]
    #[case("London, UK", "London, United Kingdom")]
    #[case("Paris, France", "Paris, France")]
    fn test_expand_abbreviations(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(expand_abbreviations(input), expected);
    }

    #[test]
    fn test_parse_location_reply() {
        assert_eq!(parse_location_reply("  Tokyo, Japan "), Some("Tokyo, Japan".to_string()));
        assert_eq!(parse_location_reply("\"Oslo, Norway\""), Some("Oslo, Norway".to_string()));
        assert_eq!(parse_location_reply("none"), None);
        assert_eq!(parse_location_reply("None."), None);
        assert_eq!(parse_location_reply(""), None);
        assert_eq!(parse_location_reply("I think the user means\nParis"), None);
    }

    #[tokio::test]
    async fn test_non_weather_turn_skips_model() {
        let model = Arc::new(CityLookupModel::new());
        let classifier = IntentClassifier::new(model.clone());

        let history = vec![ConversationTurn::user("thanks, that was helpful!")];
        let result = classifier.classify(&history).await;

        assert_eq!(result.intent, QueryIntent::None);
        assert_eq!(result.location, None);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_location_inherited_from_prior_turn() {
        let classifier = IntentClassifier::new(Arc::new(CityLookupModel::new()));

        let history = vec![
            ConversationTurn::user("weather in Tokyo?"),
            ConversationTurn::assistant("It's 21°C and clear in Tokyo right now."),
            ConversationTurn::user("what about tomorrow?"),
        ];
        let result = classifier.classify(&history).await;

        assert_eq!(result.location.as_deref(), Some("Tokyo"));
        assert_eq!(result.intent, QueryIntent::Forecast);
    }

    #[tokio::test]
    async fn test_weather_query_without_any_location() {
        let classifier = IntentClassifier::new(Arc::new(CityLookupModel::new()));

        let history = vec![ConversationTurn::user("what's the weather like?")];
        let result = classifier.classify(&history).await;

        // Cannot answer a weather query without a place
        assert_eq!(result.intent, QueryIntent::None);
        assert_eq!(result.location, None);
    }

    #[tokio::test]
    async fn test_model_failure_fails_soft() {
        let classifier = IntentClassifier::new(Arc::new(FailingModel));

        let history = vec![ConversationTurn::user("what's the weather in Paris?")];
        let result = classifier.classify(&history).await;

        assert_eq!(result.intent, QueryIntent::None);
        assert_eq!(result.location, None);
    }
}
