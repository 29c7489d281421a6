// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence attached to exact recommendation and situational detections.
pub const EXACT_MATCH_CONFIDENCE: f64 = 0.9;

/// Confidence when no resolver could find a location.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Confidence of a generative parse that failed or returned garbage.
pub const DEGRADED_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    GeneralWeather,
    Temperature,
    CurrentWeather,
    Humidity,
    Wind,
    Precipitation,
}

impl WeatherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherKind::GeneralWeather => "general_weather",
            WeatherKind::Temperature => "temperature",
            WeatherKind::CurrentWeather => "current_weather",
            WeatherKind::Humidity => "humidity",
            WeatherKind::Wind => "wind",
            WeatherKind::Precipitation => "precipitation",
        }
    }
}

/// What sort of place a recommendation query is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Beach,
    City,
    Mountain,
    Place,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Beach => "beach",
            Category::City => "city",
            Category::Mountain => "mountain",
            Category::Place => "place",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Category::Beach => "beaches",
            Category::City => "cities",
            Category::Mountain => "mountains",
            Category::Place => "places",
        }
    }

    /// Accepts the singular, the plural, or a `<category>_recommendation` label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        let label = label.strip_suffix("_recommendation").unwrap_or(&label);
        match label {
            "beach" | "beaches" => Some(Category::Beach),
            "city" | "cities" => Some(Category::City),
            "mountain" | "mountains" => Some(Category::Mountain),
            "place" | "places" => Some(Category::Place),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Weather(WeatherKind),
    /// The user wants to go somewhere but has not said where they are.
    Situational,
    Recommendation {
        category: Category,
        country: Option<String>,
    },
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Weather(kind) => kind.as_str(),
            Intent::Situational => "situational",
            Intent::Recommendation { .. } => "recommendation",
        }
    }

    pub fn is_recommendation(&self) -> bool {
        matches!(self, Intent::Recommendation { .. })
    }

    pub fn is_situational(&self) -> bool {
        matches!(self, Intent::Situational)
    }

    /// Maps a free-form intent label (as emitted by a language model or read
    /// back from a `parsed_query` object) onto the closed intent set.
    /// Unknown labels collapse to `general_weather`.
    pub fn from_label(label: &str, recommendation_type: Option<&str>, country: Option<String>) -> Self {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");

        if normalized == "recommendation" {
            let category = recommendation_type
                .and_then(Category::from_label)
                .unwrap_or(Category::Place);
            return Intent::Recommendation { category, country };
        }
        if normalized.ends_with("_recommendation") {
            if let Some(category) = Category::from_label(&normalized) {
                return Intent::Recommendation { category, country };
            }
            return Intent::Recommendation {
                category: Category::Place,
                country,
            };
        }

        match normalized.as_str() {
            "situational" => Intent::Situational,
            "temperature" => Intent::Weather(WeatherKind::Temperature),
            "current_weather" | "weather" | "forecast" | "condition" | "conditions" => {
                Intent::Weather(WeatherKind::CurrentWeather)
            }
            "humidity" => Intent::Weather(WeatherKind::Humidity),
            "wind" => Intent::Weather(WeatherKind::Wind),
            "precipitation" => Intent::Weather(WeatherKind::Precipitation),
            _ => Intent::Weather(WeatherKind::GeneralWeather),
        }
    }
}

/// Which resolver produced a [`ParsedIntent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverTag {
    RuleBased,
    EntityExtractor,
    Generative,
    UserLocation,
}

impl ResolverTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverTag::RuleBased => "rule-based",
            ResolverTag::EntityExtractor => "entity-extractor",
            ResolverTag::Generative => "generative",
            ResolverTag::UserLocation => "user-location",
        }
    }

    fn from_label(label: &str) -> Self {
        match label {
            "rule-based" => ResolverTag::RuleBased,
            "entity-extractor" => ResolverTag::EntityExtractor,
            "user-location" => ResolverTag::UserLocation,
            _ => ResolverTag::Generative,
        }
    }
}

impl fmt::Display for ResolverTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured, confidence-scored reading of one user query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ParsedQuery", from = "ParsedQuery")]
pub struct ParsedIntent {
    pub original_text: String,
    pub intent: Intent,
    pub location: Option<String>,
    pub confidence: f64,
    pub resolver: ResolverTag,
}

impl ParsedIntent {
    pub fn new(
        original_text: impl Into<String>,
        intent: Intent,
        location: Option<String>,
        confidence: f64,
        resolver: ResolverTag,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            intent,
            location,
            confidence: confidence.clamp(0.0, 1.0),
            resolver,
        }
    }

    /// The fallback reading used when the generative parser is unreachable or
    /// returns something that is not the expected JSON.
    pub fn degraded(original_text: impl Into<String>) -> Self {
        Self::new(
            original_text,
            Intent::Weather(WeatherKind::GeneralWeather),
            None,
            DEGRADED_CONFIDENCE,
            ResolverTag::Generative,
        )
    }

    pub fn category(&self) -> Option<Category> {
        match &self.intent {
            Intent::Recommendation { category, .. } => Some(*category),
            _ => None,
        }
    }

    pub fn country(&self) -> Option<&str> {
        match &self.intent {
            Intent::Recommendation { country, .. } => country.as_deref(),
            _ => None,
        }
    }
}

/// Flat wire form of a [`ParsedIntent`], as exposed in `parsed_query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub original_query: String,
    pub intent: String,
    #[serde(default)]
    pub location: Option<String>,
    pub confidence: f64,
    pub processing_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl From<ParsedIntent> for ParsedQuery {
    fn from(parsed: ParsedIntent) -> Self {
        let (recommendation_type, country) = match &parsed.intent {
            Intent::Recommendation { category, country } => {
                (Some(category.as_str().to_string()), country.clone())
            }
            _ => (None, None),
        };
        Self {
            original_query: parsed.original_text,
            intent: parsed.intent.label().to_string(),
            location: parsed.location,
            confidence: parsed.confidence,
            processing_method: parsed.resolver.as_str().to_string(),
            recommendation_type,
            country,
        }
    }
}

impl From<ParsedQuery> for ParsedIntent {
    fn from(wire: ParsedQuery) -> Self {
        let intent = Intent::from_label(
            &wire.intent,
            wire.recommendation_type.as_deref(),
            wire.country,
        );
        ParsedIntent::new(
            wire.original_query,
            intent,
            wire.location,
            wire.confidence,
            ResolverTag::from_label(&wire.processing_method),
        )
    }
}
