// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Language-model backed query parsing.
//!
//! A [`Generator`] turns a prompt into raw text. [`GenerativeParser`] wraps
//! one with a timeout and the three prompts SkyCast needs: parsing a query
//! into a [`ParsedIntent`], naming candidate places for a recommendation,
//! and proposing new vocabulary phrases. Every failure degrades instead of
//! propagating, so arbitration always has something to compare against.

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use skycast_lexicon::{Intent, ParsedIntent, ResolverTag};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Category name to new trigger phrases, the shape the vocabulary merges.
pub type KeywordUpdates = BTreeMap<String, Vec<String>>;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Request timeout after {0} seconds")]
    Timeout(u64),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {0} from generator")]
    Status(u16),
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),
    #[error("Generator returned empty response")]
    EmptyResponse,
}

/// Prompt in, raw model text out.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GeneratorError>> + Send;

    fn is_available(&self) -> impl Future<Output = bool> + Send;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Client for an Ollama server's `/api/generate` endpoint.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaGenerator {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeneratorError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
            "options": {
                "temperature": 0.1,
                "top_p": 0.9,
            },
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout(self.timeout_secs)
                } else {
                    GeneratorError::Http(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(GeneratorError::Status(response.status().as_u16()));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidJson(format!("Failed to parse response: {}", e)))?;
        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("[Generative] Availability probe failed: {}", e);
                false
            }
        }
    }
}

pub const PARSE_INSTRUCTIONS: &str = r#"You read weather questions and answer with one JSON object and nothing else.

Fields:
- "intent": one of current_weather, temperature, humidity, wind, precipitation, general_weather, situational, beach_recommendation, city_recommendation, mountain_recommendation, place_recommendation
- "location": the city, region or country the question is about, or null
- "confidence": a number between 0 and 1 (0.8-0.9 when the question is clear, 0.6-0.7 when it is not)
- "keywords": an object from category (recommendation, location, situational, weather) to the words of the question that signalled it

Resolve nicknames to real names ("Big Apple" means New York).
A bare place name is general_weather. "Best <kind> in <country>" is a recommendation whose location is the country.
Asking where to go without naming a place is situational.

Examples:
Query: "Temperature in Madrid" -> {"intent": "temperature", "location": "Madrid", "confidence": 0.9, "keywords": {"weather": ["temperature"]}}
Query: "Marseille" -> {"intent": "general_weather", "location": "Marseille", "confidence": 0.8, "keywords": {}}
Query: "Top peaks in Switzerland" -> {"intent": "mountain_recommendation", "location": "Switzerland", "confidence": 0.9, "keywords": {"recommendation": ["top"], "location": ["peaks"]}}
Query: "Where should I go this weekend?" -> {"intent": "situational", "location": null, "confidence": 0.9, "keywords": {"situational": ["where", "should go"]}}"#;

pub const RECOMMEND_INSTRUCTIONS: &str = r#"You suggest travel destinations. Answer with one JSON object of the form {"locations": ["...", "..."]} and nothing else.

Name 3 to 5 specific, well-known places inside the requested country, never the country itself.
Mountains must be actual peaks or ranges ("Matterhorn", "Eiger"), not nearby towns.
Cities must be city names. Beaches may be beaches or coastal areas ("Costa Brava", "Sardinia").

Examples:
Query: "Best cities in Spain" -> {"locations": ["Madrid", "Barcelona", "Seville", "Valencia"]}
Query: "Best beaches in Italy" -> {"locations": ["Sardinia", "Amalfi Coast", "Cinque Terre"]}"#;

pub const ENRICH_PROMPT: &str = r#"You maintain the trigger words of a travel and weather assistant. Answer with one JSON object and nothing else, mapping each category to 10-15 common words or short phrases people use for it:

{
  "recommendation": ["best", "top", "..."],
  "location": ["beach", "summit", "old town", "..."],
  "situational": ["where", "should go", "..."]
}

Use plain, everyday travel language. Lowercase everything."#;

pub fn parse_prompt(query: &str) -> String {
    format!("{}\n\nQuery: {}", PARSE_INSTRUCTIONS, query)
}

pub fn recommend_prompt(request: &str) -> String {
    format!("{}\n\nQuery: {}", RECOMMEND_INSTRUCTIONS, request)
}

/// What the parse prompt must come back with. `intent` and `confidence` are
/// required; everything else is optional.
#[derive(Debug, Deserialize)]
struct ParseContract {
    intent: String,
    #[serde(default)]
    location: Option<String>,
    confidence: f64,
    #[serde(default)]
    keywords: Option<Value>,
    #[serde(default)]
    recommendation_type: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerativeParse {
    pub parsed: ParsedIntent,
    /// Phrases to feed back into the vocabulary. Empty when the model offered
    /// none or the parse degraded.
    pub keywords: KeywordUpdates,
}

impl GenerativeParse {
    pub fn degraded(query: &str) -> Self {
        Self {
            parsed: ParsedIntent::degraded(query),
            keywords: KeywordUpdates::new(),
        }
    }
}

fn meaningful(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null") && !v.eq_ignore_ascii_case("unknown"))
}

/// Accepts `{category: [phrases]}` and tolerates single strings in place of
/// arrays. Anything else in the object is ignored.
pub fn keyword_updates(value: &Value) -> KeywordUpdates {
    let Some(object) = value.as_object() else {
        return KeywordUpdates::new();
    };
    object
        .iter()
        .filter_map(|(category, phrases)| {
            let phrases: Vec<String> = match phrases {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            let phrases: Vec<String> = phrases
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            (!phrases.is_empty()).then(|| (category.clone(), phrases))
        })
        .collect()
}

/// Reads the model's text as the parse contract. The text must be a single
/// JSON object; surrounding whitespace is the only thing tolerated.
pub fn interpret_generation(query: &str, text: &str) -> Result<GenerativeParse, GeneratorError> {
    let contract: ParseContract = serde_json::from_str(text.trim())
        .map_err(|e| GeneratorError::InvalidJson(e.to_string()))?;

    let location = meaningful(contract.location);
    let intent = Intent::from_label(
        &contract.intent,
        contract.recommendation_type.as_deref(),
        meaningful(contract.country).or_else(|| location.clone()),
    );
    let location = if intent.is_recommendation() { None } else { location };

    let keywords = contract
        .keywords
        .as_ref()
        .map(keyword_updates)
        .unwrap_or_default();

    Ok(GenerativeParse {
        parsed: ParsedIntent::new(
            query,
            intent,
            location,
            contract.confidence,
            ResolverTag::Generative,
        ),
        keywords,
    })
}

/// Candidate place names from a recommend reply, trimmed and deduplicated in
/// order. A bare JSON array is accepted too.
pub fn interpret_locations(text: &str) -> Result<Vec<String>, GeneratorError> {
    let value: Value =
        serde_json::from_str(text.trim()).map_err(|e| GeneratorError::InvalidJson(e.to_string()))?;
    let items = match &value {
        Value::Array(items) => items,
        Value::Object(object) => match object.get("locations") {
            Some(Value::Array(items)) => items,
            _ => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };

    let mut locations: Vec<String> = Vec::new();
    for name in items.iter().filter_map(Value::as_str).map(str::trim) {
        if !name.is_empty() && !locations.iter().any(|l| l.eq_ignore_ascii_case(name)) {
            locations.push(name.to_string());
        }
    }
    Ok(locations)
}

/// A [`Generator`] plus a per-call timeout and the SkyCast prompts.
pub struct GenerativeParser<G> {
    generator: G,
    timeout: Duration,
}

impl<G: Generator> GenerativeParser<G> {
    pub fn new(generator: G, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        match tokio::time::timeout(self.timeout, self.generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GeneratorError::Timeout(self.timeout.as_secs())),
        }
    }

    /// Never fails: any error yields [`GenerativeParse::degraded`].
    pub async fn parse(&self, query: &str) -> GenerativeParse {
        let outcome = match self.generate(&parse_prompt(query)).await {
            Ok(text) => interpret_generation(query, &text),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(parse) => {
                debug!(
                    "[Generative] intent={} location={:?} confidence={:.2} keyword_categories={}",
                    parse.parsed.intent.label(),
                    parse.parsed.location,
                    parse.parsed.confidence,
                    parse.keywords.len()
                );
                parse
            }
            Err(e) => {
                warn!("[Generative] Parse degraded: {}", e);
                GenerativeParse::degraded(query)
            }
        }
    }

    /// Candidate locations for a request such as "Best beaches in Italy".
    /// Failures give an empty list.
    pub async fn recommend(&self, request: &str) -> Vec<String> {
        let outcome = match self.generate(&recommend_prompt(request)).await {
            Ok(text) => interpret_locations(&text),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(locations) => {
                debug!(
                    "[Generative] Recommend request={:?} candidates={:?}",
                    request, locations
                );
                locations
            }
            Err(e) => {
                warn!("[Generative] Recommend failed for {:?}: {}", request, e);
                Vec::new()
            }
        }
    }

    /// Asks for fresh synonyms for every vocabulary category.
    pub async fn enrich(&self) -> Result<KeywordUpdates, GeneratorError> {
        let text = self.generate(ENRICH_PROMPT).await?;
        let value: Value = serde_json::from_str(text.trim())
            .map_err(|e| GeneratorError::InvalidJson(e.to_string()))?;
        Ok(keyword_updates(&value))
    }

    pub async fn is_available(&self) -> bool {
        self.generator.is_available().await
    }
}
