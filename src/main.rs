use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use skycast::{
    AppConfig, ChatModel, IntentClassifier, OpenAiChat, OpenWeatherGateway, ResponseSynthesizer,
    TurnOrchestrator, WeatherGateway, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing credentials abort here; there are no per-request config checks.
    let config = AppConfig::from_env()?;

    let model: Arc<dyn ChatModel> = Arc::new(OpenAiChat::new(&config.llm)?);
    let gateway: Arc<dyn WeatherGateway> = Arc::new(OpenWeatherGateway::new(&config.weather)?);

    let orchestrator = Arc::new(TurnOrchestrator::new(
        IntentClassifier::new(model.clone()),
        gateway,
        ResponseSynthesizer::new(model),
    ));

    web::run(orchestrator, config.server.port).await
}
