// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::arbitration::{self, MissingLocation, Resolution};
use crate::config::{ConfigError, EngineConfig};
use crate::format;
use crate::generative::{
    GenerativeParser, Generator, GeneratorError, KeywordUpdates, OllamaGenerator,
};
use crate::recommend::{self, FanOutSettings};
use crate::weather::{HttpWeatherClient, Observation, WeatherLookup};
use futures::FutureExt;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skycast_lexicon::{
    Cascade, Intent, MergeReport, ParsedIntent, Vocabulary, VocabularyStore, WeatherKind,
};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;

pub const SITUATIONAL_MESSAGE: &str = "I would love to help you find that place! To give you accurate weather information, could you tell me your current city or location?";
pub const NO_LOCATION_MESSAGE: &str =
    "I need a location to provide weather information. Please specify a city or place.";

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    #[serde(default)]
    pub user_location: Option<String>,
    #[serde(default)]
    pub chat_history: Option<Vec<ChatTurn>>,
}

impl AskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.user_location = Some(location.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
    LocationRequired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
    pub status: Status,
    pub parsed_query: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<Value>,
    pub processing_method: String,
    #[serde(default)]
    pub requires_location: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<String>>,
}

impl AskResponse {
    fn failure(query: &str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            response: format!("Sorry, I encountered an error: {}", detail),
            status: Status::Error,
            parsed_query: serde_json::json!({ "original_query": query, "error": detail }),
            weather_data: None,
            processing_method: "error".to_string(),
            requires_location: false,
            suggested_actions: None,
        }
    }
}

fn parsed_query(parsed: &ParsedIntent) -> Value {
    serde_json::to_value(parsed).unwrap_or_default()
}

fn parsed_query_with_error(parsed: &ParsedIntent, detail: &str) -> Value {
    let mut value = parsed_query(parsed);
    if let Value::Object(map) = &mut value {
        map.insert("error".to_string(), Value::String(detail.to_string()));
    }
    value
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "internal fault".to_string())
}

/// One question in, one answer out. Holds every collaborator a request
/// needs; share it behind an `Arc` between concurrent requests.
pub struct Engine<G, W> {
    cascade: Cascade,
    parser: GenerativeParser<G>,
    lookup: W,
    vocabulary: Arc<VocabularyStore>,
    config: EngineConfig,
}

impl Engine<OllamaGenerator, HttpWeatherClient> {
    /// Wires the HTTP collaborators and the on-disk vocabulary from `config`.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let generator = OllamaGenerator::new(
            config.generator_url.clone(),
            config.generator_model.clone(),
            config.generator_timeout(),
        )?;
        let lookup = HttpWeatherClient::new(
            config.weather_url.clone(),
            config.lookup_timeout(),
            config.observation_cache_ttl(),
            config.observation_cache_capacity,
        )?;
        let vocabulary = Arc::new(VocabularyStore::load(config.vocabulary_path()));
        Ok(Self::new(generator, lookup, vocabulary, config))
    }
}

impl<G: Generator, W: WeatherLookup> Engine<G, W> {
    pub fn new(
        generator: G,
        lookup: W,
        vocabulary: Arc<VocabularyStore>,
        config: EngineConfig,
    ) -> Self {
        let parser = GenerativeParser::new(generator, config.generator_timeout());
        Self {
            cascade: Cascade::default(),
            parser,
            lookup,
            vocabulary,
            config,
        }
    }

    pub fn with_cascade(mut self, cascade: Cascade) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn vocabulary(&self) -> &Arc<VocabularyStore> {
        &self.vocabulary
    }

    pub fn lookup(&self) -> &W {
        &self.lookup
    }

    pub fn parser(&self) -> &GenerativeParser<G> {
        &self.parser
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn is_generator_available(&self) -> bool {
        self.parser.is_available().await
    }

    /// Answers one request. Never fails: timeouts and internal faults come
    /// back as `status: error` responses. When the request timeout expires
    /// every downstream call still in flight is dropped.
    pub async fn ask(&self, request: AskRequest) -> AskResponse {
        let query = request.query.trim().to_string();
        let limit = self.config.request_timeout();
        let handled = AssertUnwindSafe(self.handle(&query, request.user_location.as_deref()))
            .catch_unwind();

        match tokio::time::timeout(limit, handled).await {
            Ok(Ok(response)) => response,
            Ok(Err(payload)) => {
                let detail = panic_message(payload.as_ref());
                error!("[Engine] Request {:?} panicked: {}", query, detail);
                AskResponse::failure(&query, detail)
            }
            Err(_) => {
                warn!("[Engine] Request {:?} timed out after {}s", query, limit.as_secs());
                AskResponse::failure(
                    &query,
                    format!("request timed out after {}s", limit.as_secs()),
                )
            }
        }
    }

    async fn handle(&self, query: &str, user_location: Option<&str>) -> AskResponse {
        if query.is_empty() {
            return AskResponse::failure(query, "empty query");
        }

        let vocabulary = self.current_vocabulary().await;
        let rule = self.cascade.resolve_or_default(query, &vocabulary);

        let generative = self.parser.parse(query).await;
        if !generative.keywords.is_empty() {
            self.learn(generative.keywords);
        }

        debug!(
            "[Engine] rule={}:{}:{:.2} generative={}:{:.2}",
            rule.resolver,
            rule.intent.label(),
            rule.confidence,
            generative.parsed.intent.label(),
            generative.parsed.confidence
        );

        match arbitration::arbitrate(query, rule, generative.parsed, user_location) {
            Resolution::Recommend(parsed) => self.recommend(parsed).await,
            Resolution::LocationRequired {
                reason: MissingLocation::Situational,
                parsed,
                suggestions,
            } => AskResponse {
                response: SITUATIONAL_MESSAGE.to_string(),
                status: Status::LocationRequired,
                parsed_query: parsed_query(&parsed),
                weather_data: None,
                processing_method: "situational".to_string(),
                requires_location: true,
                suggested_actions: Some(suggestions),
            },
            Resolution::LocationRequired {
                reason: MissingLocation::NoLocation,
                parsed,
                suggestions,
            } => AskResponse {
                response: NO_LOCATION_MESSAGE.to_string(),
                status: Status::LocationRequired,
                parsed_query: parsed_query_with_error(&parsed, "No location found"),
                weather_data: None,
                processing_method: "none".to_string(),
                requires_location: true,
                suggested_actions: Some(suggestions),
            },
            Resolution::Lookup { parsed, location } => self.single(parsed, location).await,
        }
    }

    /// Refreshes from disk on the blocking pool and returns a snapshot.
    async fn current_vocabulary(&self) -> Vocabulary {
        let store = Arc::clone(&self.vocabulary);
        match tokio::task::spawn_blocking(move || {
            store.refresh();
            store.snapshot()
        })
        .await
        {
            Ok(vocabulary) => vocabulary,
            Err(e) => {
                warn!("[Engine] Vocabulary refresh failed: {}", e);
                self.vocabulary.snapshot()
            }
        }
    }

    /// Feeds generator keywords into the vocabulary on the blocking pool.
    /// The request does not wait for it.
    fn learn(&self, keywords: KeywordUpdates) {
        let store = Arc::clone(&self.vocabulary);
        tokio::task::spawn_blocking(move || {
            let report = store.merge(&keywords);
            if report.added > 0 {
                debug!("[Engine] Learned {} phrases", report.added);
            }
        });
    }

    async fn single(&self, parsed: ParsedIntent, location: String) -> AskResponse {
        let kind = match parsed.intent {
            Intent::Weather(kind) => kind,
            _ => WeatherKind::GeneralWeather,
        };
        let timeout = self.config.lookup_timeout();
        let observation =
            match tokio::time::timeout(timeout, self.lookup.lookup(&location, kind)).await {
                Ok(observation) => observation,
                Err(_) => Observation::failed(
                    location.as_str(),
                    format!("timed out after {}s", timeout.as_secs()),
                ),
            };

        let (response, status) = if observation.success {
            let shown = if observation.location.trim().is_empty() {
                location.as_str()
            } else {
                observation.location.as_str()
            };
            (format::single(shown, &observation), Status::Success)
        } else {
            info!(
                "[Engine] No weather for {}: {}",
                location,
                observation.error.as_deref().unwrap_or("unknown error")
            );
            (
                format!("Sorry, I couldn't get weather data for {}", location),
                Status::Error,
            )
        };

        AskResponse {
            response,
            status,
            parsed_query: parsed_query(&parsed),
            weather_data: serde_json::to_value(&observation).ok(),
            processing_method: parsed.resolver.as_str().to_string(),
            requires_location: false,
            suggested_actions: None,
        }
    }

    async fn recommend(&self, parsed: ParsedIntent) -> AskResponse {
        let settings = FanOutSettings {
            limit: self.config.fan_out_limit,
            lookup_timeout: self.config.lookup_timeout(),
        };
        match recommend::recommend(&parsed, &self.parser, &self.lookup, settings).await {
            Ok(result) => AskResponse {
                response: format::recommendation(&result),
                status: Status::Success,
                parsed_query: parsed_query(&parsed),
                weather_data: serde_json::to_value(&result).ok(),
                processing_method: "recommendation".to_string(),
                requires_location: false,
                suggested_actions: None,
            },
            Err(e) => {
                let detail = e.to_string();
                AskResponse {
                    parsed_query: parsed_query_with_error(&parsed, &detail),
                    response: detail,
                    status: Status::Error,
                    weather_data: None,
                    processing_method: "recommendation".to_string(),
                    requires_location: false,
                    suggested_actions: None,
                }
            }
        }
    }

    /// Asks the generator for fresh trigger phrases and merges them, waiting
    /// for the write to finish.
    pub async fn enrich_vocabulary(&self) -> Result<MergeReport, EngineError> {
        let updates = self.parser.enrich().await?;
        let store = Arc::clone(&self.vocabulary);
        let report = tokio::task::spawn_blocking(move || store.merge(&updates)).await?;
        info!(
            "[Engine] Enrichment added {} phrases ({:?})",
            report.added, report.persistence
        );
        Ok(report)
    }
}
