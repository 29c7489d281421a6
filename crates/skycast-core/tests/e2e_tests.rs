use serde_json::Value;
use simplelog::{Config, LevelFilter, TestLogger};
use skycast_core::engine::{NO_LOCATION_MESSAGE, SITUATIONAL_MESSAGE};
use skycast_core::generative::{ENRICH_PROMPT, RECOMMEND_INSTRUCTIONS};
use skycast_core::{
    AskRequest, Engine, EngineConfig, Generator, GeneratorError, Observation, Status,
    WeatherLookup,
};
use skycast_lexicon::vocabulary::WEATHER;
use skycast_lexicon::{VocabularyStore, WeatherKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Answers parse prompts from a per-query table, recommend prompts with a
/// fixed candidate list, and records every prompt it sees.
#[derive(Default)]
struct FakeModel {
    parses: HashMap<String, String>,
    locations: String,
    enrichment: String,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    fn parse(mut self, query: &str, reply: &str) -> Self {
        self.parses.insert(query.to_string(), reply.to_string());
        self
    }

    fn locations(mut self, reply: &str) -> Self {
        self.locations = reply.to_string();
        self
    }

    fn recommend_prompts(&self) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.starts_with(RECOMMEND_INSTRUCTIONS))
            .count()
    }
}

impl Generator for FakeModel {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.starts_with(RECOMMEND_INSTRUCTIONS) {
            return Ok(self.locations.clone());
        }
        if prompt == ENRICH_PROMPT {
            return Ok(self.enrichment.clone());
        }
        let query = prompt.rsplit("Query: ").next().unwrap_or_default();
        self.parses
            .get(query)
            .cloned()
            .ok_or(GeneratorError::Status(503))
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// Sunny everywhere it knows about; fails everywhere else.
#[derive(Default)]
struct FakeWeather {
    known: HashMap<String, (String, String)>,
    calls: Mutex<Vec<String>>,
}

impl FakeWeather {
    fn with(mut self, location: &str, temperature: &str, condition: &str) -> Self {
        self.known.insert(
            location.to_string(),
            (temperature.to_string(), condition.to_string()),
        );
        self
    }

    fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

impl WeatherLookup for FakeWeather {
    async fn lookup(&self, location: &str, _kind: WeatherKind) -> Observation {
        self.calls.lock().unwrap().push(location.to_string());
        match self.known.get(location) {
            Some((t, c)) => Observation::succeeded(location, Some(t.clone()), Some(c.clone())),
            None => Observation::failed(location, "location not found"),
        }
    }
}

fn engine(model: FakeModel, weather: FakeWeather) -> (Engine<FakeModel, FakeWeather>, TempDir) {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    let dir = TempDir::new().unwrap();
    let store = Arc::new(VocabularyStore::load(dir.path().join("vocabulary.json")));
    (Engine::new(model, weather, store, EngineConfig::default()), dir)
}

#[tokio::test]
async fn test_weather_in_paris() {
    let model = FakeModel::default().parse(
        "Weather in Paris",
        r#"{"intent": "current_weather", "location": "Paris", "confidence": 0.9}"#,
    );
    let weather = FakeWeather::default().with("Paris", "18°C", "Partly Cloudy");
    let (engine, _dir) = engine(model, weather);

    let response = engine.ask(AskRequest::new("Weather in Paris")).await;

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.parsed_query["location"], "Paris");
    assert_eq!(response.parsed_query["intent"], "current_weather");
    // Equal confidence: the rule-based side wins the tie.
    assert_eq!(response.processing_method, "entity-extractor");
    assert_eq!(
        response.response,
        "Here's the weather for Paris: 🌡️ Temperature: 18°C ☁️ Condition: Partly Cloudy"
    );
    assert_eq!(response.weather_data.unwrap()["success"], true);
    assert!(!response.requires_location);
}

#[tokio::test]
async fn test_best_beaches_in_italy_fans_out() {
    let model = FakeModel::default()
        .locations(r#"{"locations": ["Sardinia", "Sicily", "Amalfi Coast", "Rimini"]}"#);
    let weather = FakeWeather::default().with("Sicily", "24°C", "Sunny");
    let (engine, _dir) = engine(model, weather);

    let response = engine.ask(AskRequest::new("Best beaches in Italy")).await;

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.parsed_query["intent"], "recommendation");
    assert_eq!(response.parsed_query["recommendation_type"], "beach");
    assert_eq!(response.parsed_query["country"], "Italy");
    assert_eq!(response.parsed_query["confidence"], 0.9);
    assert_eq!(
        response.response,
        "Best beaches in Italy today:\n🏙️ Sicily: 24°C, Sunny"
    );

    let data = response.weather_data.unwrap();
    assert_eq!(data["observations"].as_array().map(Vec::len), Some(1));
    assert_eq!(data["at_least_one_success"], true);
    // Only the first three candidates are looked up.
    assert_eq!(
        engine.lookup().calls(),
        vec!["Amalfi Coast", "Sardinia", "Sicily"]
    );
}

#[tokio::test]
async fn test_best_mountains_in_switzerland_uses_peak_table() {
    let model = FakeModel::default().locations(r#"{"locations": ["Zurich", "Geneva", "Basel"]}"#);
    let weather = FakeWeather::default()
        .with("Matterhorn", "-4°C", "Snow")
        .with("Jungfrau", "-2°C", "Clear")
        .with("Eiger", "-3°C", "Windy");
    let (engine, _dir) = engine(model, weather);

    let response = engine
        .ask(AskRequest::new("Best mountains in Switzerland"))
        .await;

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.parsed_query["recommendation_type"], "mountain");
    let data = response.weather_data.unwrap();
    let candidates: Vec<&str> = data["candidate_locations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(
        candidates,
        vec!["Matterhorn", "Jungfrau", "Eiger", "Pilatus", "Rigi"]
    );
    assert_eq!(engine.lookup().calls(), vec!["Eiger", "Jungfrau", "Matterhorn"]);
    assert_eq!(engine.parser().generator().recommend_prompts(), 0);
    assert!(response.response.starts_with("Best mountains in Switzerland today:\n🏙️ Matterhorn: -4°C, Snow"));
}

#[tokio::test]
async fn test_recommendation_without_weather_is_an_error() {
    let model = FakeModel::default().locations(r#"{"locations": ["Madrid", "Seville"]}"#);
    let (engine, _dir) = engine(model, FakeWeather::default());

    let response = engine.ask(AskRequest::new("Top cities in Spain")).await;

    assert_eq!(response.status, Status::Error);
    assert_eq!(
        response.response,
        "Sorry, I couldn't get weather data for the recommended cities in Spain."
    );
    assert_eq!(response.parsed_query["error"], response.response.as_str());
}

#[tokio::test]
async fn test_where_should_i_go_needs_a_location() {
    let (engine, _dir) = engine(FakeModel::default(), FakeWeather::default());

    let response = engine.ask(AskRequest::new("Where should I go?")).await;

    assert_eq!(response.status, Status::LocationRequired);
    assert!(response.requires_location);
    assert_eq!(response.response, SITUATIONAL_MESSAGE);
    let suggestions = response.suggested_actions.unwrap();
    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0], "Tell me your current location");
    assert!(engine.lookup().calls().is_empty());
}

#[tokio::test]
async fn test_where_should_i_go_with_user_location() {
    let weather = FakeWeather::default().with("Berlin", "12°C", "Overcast");
    let (engine, _dir) = engine(FakeModel::default(), weather);

    let response = engine
        .ask(AskRequest::new("Where should I go?").with_location("Berlin"))
        .await;

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.processing_method, "user-location");
    assert_eq!(response.parsed_query["location"], "Berlin");
    assert_eq!(response.parsed_query["intent"], "general_weather");
    assert!(response.response.contains("Overcast"));
}

#[tokio::test]
async fn test_no_location_anywhere() {
    let (engine, _dir) = engine(FakeModel::default(), FakeWeather::default());

    let response = engine.ask(AskRequest::new("is it going to be nice later")).await;

    assert_eq!(response.status, Status::LocationRequired);
    assert_eq!(response.response, NO_LOCATION_MESSAGE);
    assert_eq!(response.parsed_query["error"], "No location found");
    assert_eq!(
        response.suggested_actions,
        Some(vec!["Please provide your city or location".to_string()])
    );
    assert!(engine.lookup().calls().is_empty());
}

#[tokio::test]
async fn test_weather_word_alone_asks_for_location() {
    // Generator unavailable: only the rule-based side answers.
    let (engine, _dir) = engine(FakeModel::default(), FakeWeather::default());

    for query in ["Humidity today", "Rain tomorrow?", "Sunny this weekend?"] {
        let response = engine.ask(AskRequest::new(query)).await;
        assert_eq!(response.status, Status::LocationRequired, "{:?}", query);
        assert_eq!(response.response, NO_LOCATION_MESSAGE, "{:?}", query);
    }
    assert!(engine.lookup().calls().is_empty());
}

#[tokio::test]
async fn test_phrases_written_by_another_process_are_picked_up() {
    let (engine, dir) = engine(FakeModel::default(), FakeWeather::default());
    let query = "Any cozy spots to visit";

    let response = engine.ask(AskRequest::new(query)).await;
    assert_eq!(response.status, Status::LocationRequired);
    assert_eq!(response.processing_method, "none");

    let other = VocabularyStore::load(dir.path().join("vocabulary.json"));
    let mut updates = std::collections::BTreeMap::new();
    updates.insert("situational".to_string(), vec!["spots to visit".to_string()]);
    assert_eq!(other.merge(&updates).added, 1);

    let response = engine.ask(AskRequest::new(query)).await;
    assert_eq!(response.response, SITUATIONAL_MESSAGE);
    assert_eq!(response.processing_method, "situational");
}

#[tokio::test]
async fn test_failed_lookup_reports_location() {
    let (engine, _dir) = engine(FakeModel::default(), FakeWeather::default());

    let response = engine.ask(AskRequest::new("Weather in Atlantis")).await;

    assert_eq!(response.status, Status::Error);
    assert_eq!(response.response, "Sorry, I couldn't get weather data for Atlantis");
    assert_eq!(response.weather_data.unwrap()["success"], false);
}

#[tokio::test]
async fn test_more_confident_generative_reading_wins() {
    let model = FakeModel::default().parse(
        "Temperature somewhere sunny",
        r#"{"intent": "temperature", "location": "Lisbon", "confidence": 0.85}"#,
    );
    let weather = FakeWeather::default().with("Lisbon", "26°C", "Sunny");
    let (engine, _dir) = engine(model, weather);

    let response = engine
        .ask(AskRequest::new("Temperature somewhere sunny"))
        .await;

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.processing_method, "generative");
    assert_eq!(engine.lookup().calls(), vec!["Lisbon"]);
}

#[tokio::test]
async fn test_generative_keywords_reach_the_vocabulary() {
    let model = FakeModel::default().parse(
        "Weather in Paris",
        r#"{"intent": "current_weather", "location": "Paris", "confidence": 0.9, "keywords": {"weather": ["drizzly"]}}"#,
    );
    let weather = FakeWeather::default().with("Paris", "11°C", "Drizzle");
    let (engine, dir) = engine(model, weather);

    let response = engine.ask(AskRequest::new("Weather in Paris")).await;
    assert_eq!(response.status, Status::Success);

    // The merge runs in the background; give it a moment.
    let mut learned = false;
    for _ in 0..200 {
        if engine.vocabulary().snapshot().contains(WEATHER, "drizzly") {
            learned = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(learned, "keyword never merged");

    let mut persisted = false;
    for _ in 0..200 {
        let reloaded = VocabularyStore::load(dir.path().join("vocabulary.json"));
        if reloaded.snapshot().contains(WEATHER, "drizzly") {
            persisted = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(persisted, "keyword never saved");
}

#[tokio::test]
async fn test_enrich_vocabulary_waits_for_merge() {
    let model = FakeModel {
        enrichment: r#"{"situational": ["advise me"], "recommendation": ["premium"]}"#.to_string(),
        ..FakeModel::default()
    };
    let (engine, _dir) = engine(model, FakeWeather::default());

    let report = engine.enrich_vocabulary().await.unwrap();
    assert_eq!(report.added, 2);
    assert!(report.persistence.is_saved());
    assert!(engine.vocabulary().snapshot().contains("situational", "advise me"));

    let again = engine.enrich_vocabulary().await.unwrap();
    assert_eq!(again.added, 0);
}
