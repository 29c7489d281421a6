use skycast_core::{
    AskRequest, Engine, EngineConfig, Generator, GeneratorError, Observation, Status,
    WeatherLookup,
};
use skycast_lexicon::{VocabularyStore, WeatherKind};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Never answers within any sane timeout.
struct SilentModel;

impl Generator for SilentModel {
    async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        Err(GeneratorError::EmptyResponse)
    }

    async fn is_available(&self) -> bool {
        false
    }
}

struct SlowWeather {
    delay: Duration,
}

impl WeatherLookup for SlowWeather {
    async fn lookup(&self, location: &str, _kind: WeatherKind) -> Observation {
        tokio::time::sleep(self.delay).await;
        Observation::succeeded(location, Some("15°C".into()), Some("Clear".into()))
    }
}

fn engine(delay: Duration, config: EngineConfig) -> (Engine<SilentModel, SlowWeather>, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(VocabularyStore::load(dir.path().join("vocabulary.json")));
    (Engine::new(SilentModel, SlowWeather { delay }, store, config), dir)
}

#[tokio::test(start_paused = true)]
async fn test_stalled_generator_degrades_to_rule_based_answer() {
    let (engine, _dir) = engine(Duration::from_secs(1), EngineConfig::default());

    let started = tokio::time::Instant::now();
    let response = engine.ask(AskRequest::new("Weather in Paris")).await;

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.processing_method, "entity-extractor");
    // 30 s generator ceiling plus one lookup round trip.
    assert!(started.elapsed() < Duration::from_secs(32));
}

#[tokio::test(start_paused = true)]
async fn test_slow_lookup_becomes_failed_observation() {
    let config = EngineConfig {
        generator_timeout_secs: 1,
        lookup_timeout_secs: 5,
        ..EngineConfig::default()
    };
    let (engine, _dir) = engine(Duration::from_secs(600), config);

    let response = engine.ask(AskRequest::new("Weather in Paris")).await;

    assert_eq!(response.status, Status::Error);
    assert_eq!(response.response, "Sorry, I couldn't get weather data for Paris");
    let data = response.weather_data.unwrap();
    assert_eq!(data["success"], false);
    assert_eq!(data["error"], "timed out after 5s");
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_cancels_everything() {
    let config = EngineConfig {
        request_timeout_secs: 10,
        ..EngineConfig::default()
    };
    let (engine, _dir) = engine(Duration::from_secs(1), config);

    let started = tokio::time::Instant::now();
    let response = engine.ask(AskRequest::new("Weather in Paris")).await;

    assert_eq!(response.status, Status::Error);
    assert_eq!(
        response.response,
        "Sorry, I encountered an error: request timed out after 10s"
    );
    assert_eq!(response.parsed_query["original_query"], "Weather in Paris");
    assert_eq!(response.processing_method, "error");
    assert!(started.elapsed() < Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn test_recommendation_survives_stalled_generator() {
    let config = EngineConfig {
        generator_timeout_secs: 2,
        ..EngineConfig::default()
    };
    let (engine, _dir) = engine(Duration::from_secs(1), config);

    // The peak table needs no generator at all.
    let response = engine.ask(AskRequest::new("Best mountains in Nepal")).await;
    assert_eq!(response.status, Status::Success);
    assert!(response.response.starts_with("Best mountains in Nepal today:"));

    // Other categories do, and come back empty.
    let response = engine.ask(AskRequest::new("Best beaches in Spain")).await;
    assert_eq!(response.status, Status::Error);
    assert_eq!(
        response.response,
        "Sorry, I couldn't find recommendations for beaches in Spain."
    );
}
