// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::classifier::Resolver;
use crate::geo;
use crate::intent::{Intent, ParsedIntent, ResolverTag, WeatherKind, DEFAULT_CONFIDENCE};
use crate::vocabulary::{Vocabulary, LOCATION, RECOMMENDATION, WEATHER};
use regex::Regex;
use std::sync::OnceLock;

pub const NAMED_ENTITY_CONFIDENCE: f64 = 0.8;
pub const PROPER_NOUN_CONFIDENCE: f64 = 0.6;
pub const IN_PATTERN_CONFIDENCE: f64 = 0.7;

const WEATHER_KEYWORD_BOOST: f64 = 0.2;
const WEATHER_KEYWORD_CAP: f64 = 0.9;

/// Words that look like proper nouns at the start of a query but never name a place.
const STOPLIST: &[&str] = &[
    "weather",
    "temperature",
    "forecast",
    "today",
    "tomorrow",
    "yesterday",
];

const CLOSED_CLASS: &[&str] = &[
    "what", "whats", "how", "hows", "when", "where", "which", "who", "why", "is", "are", "was",
    "were", "will", "would", "does", "did", "can", "could", "should", "the", "and", "but",
    "for", "this", "that", "there", "then", "you", "your", "she", "him", "her", "they", "them",
    "our", "its", "tell", "show", "give", "please", "any", "some", "hey", "hello", "thanks",
];

/// Endings that keep a weather keyword a weather word ("windy", "raining").
const WEATHER_INFLECTIONS: &[&str] = &["s", "y", "ing", "er", "est", "ed", "ier", "iest"];

/// Vocabulary categories whose phrases are never place names.
const NON_PLACE_CATEGORIES: &[&str] = &[RECOMMENDATION, WEATHER, LOCATION];

/// Keyword groups in priority order; the first group with a hit decides.
const WEATHER_GROUPS: &[(WeatherKind, &[&str])] = &[
    (
        WeatherKind::Temperature,
        &["temperature", "temp", "hot", "cold", "warm", "cool"],
    ),
    (
        WeatherKind::CurrentWeather,
        &["weather", "forecast", "conditions"],
    ),
    (WeatherKind::Humidity, &["humidity", "humid", "moisture"]),
    (WeatherKind::Wind, &["wind", "breeze", "gusty"]),
    (
        WeatherKind::Precipitation,
        &["rain", "snow", "precipitation", "storm", "drizzle"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionTier {
    NamedEntity,
    ProperNoun,
    InPattern,
}

impl ExtractionTier {
    pub fn confidence(&self) -> f64 {
        match self {
            ExtractionTier::NamedEntity => NAMED_ENTITY_CONFIDENCE,
            ExtractionTier::ProperNoun => PROPER_NOUN_CONFIDENCE,
            ExtractionTier::InPattern => IN_PATTERN_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationHit {
    pub name: String,
    pub tier: ExtractionTier,
}

/// Pulls a place name out of free text: gazetteer match first, then the
/// first plausible proper noun, then an "in <Capitalized>" pattern.
/// Trigger words from `vocabulary` are never taken for proper nouns.
pub fn extract_location(query: &str, vocabulary: &Vocabulary) -> Option<LocationHit> {
    if let Some(m) = geo::find_place(query) {
        return Some(LocationHit {
            name: m.place.name.to_string(),
            tier: ExtractionTier::NamedEntity,
        });
    }

    if let Some(token) = first_proper_noun(query, vocabulary) {
        return Some(LocationHit {
            name: token.to_string(),
            tier: ExtractionTier::ProperNoun,
        });
    }

    static IN_PLACE_RE: OnceLock<Regex> = OnceLock::new();
    let re = IN_PLACE_RE.get_or_init(|| Regex::new(r"\bin\s+(\p{Lu}\p{Ll}+)").unwrap());
    re.captures(query).map(|caps| LocationHit {
        name: caps[1].to_string(),
        tier: ExtractionTier::InPattern,
    })
}

fn first_proper_noun<'q>(query: &'q str, vocabulary: &Vocabulary) -> Option<&'q str> {
    geo::tokenize(query).into_iter().find(|token| {
        let lower = token.to_lowercase();
        token.chars().next().is_some_and(char::is_uppercase)
            && token.chars().all(char::is_alphabetic)
            && token.chars().count() > 2
            && !STOPLIST.contains(&lower.as_str())
            && !CLOSED_CLASS.contains(&lower.as_str())
            && !is_weather_word(&lower)
            && !NON_PLACE_CATEGORIES
                .iter()
                .any(|category| vocabulary.matches(category, &lower))
    })
}

/// A keyword from any weather group, bare or with a common ending.
fn is_weather_word(lower: &str) -> bool {
    WEATHER_GROUPS.iter().flat_map(|(_, keywords)| keywords.iter()).any(|k| {
        lower
            .strip_prefix(k)
            .is_some_and(|rest| rest.is_empty() || WEATHER_INFLECTIONS.contains(&rest))
    })
}

/// Weather subtype from fixed keyword groups. Keywords match at the start of
/// a word, so "raining" counts as rain and "windy" as wind.
pub fn tag_weather(query: &str) -> Option<WeatherKind> {
    let lower = query.to_lowercase();
    let tokens = geo::tokenize(&lower);
    WEATHER_GROUPS
        .iter()
        .find(|(_, keywords)| {
            tokens
                .iter()
                .any(|t| keywords.iter().any(|k| t.starts_with(k)))
        })
        .map(|(kind, _)| *kind)
}

/// Location extraction plus weather-keyword tagging. Always produces an
/// intent, so it sits last in the cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn extract(&self, query: &str, vocabulary: &Vocabulary) -> ParsedIntent {
        let hit = extract_location(query, vocabulary);
        let mut confidence = hit
            .as_ref()
            .map(|h| h.tier.confidence())
            .unwrap_or(DEFAULT_CONFIDENCE);

        let kind = match tag_weather(query) {
            Some(kind) => {
                confidence = (confidence + WEATHER_KEYWORD_BOOST).min(WEATHER_KEYWORD_CAP);
                kind
            }
            None => WeatherKind::GeneralWeather,
        };

        if let Some(h) = &hit {
            log::debug!(
                "[Entity] location={} tier={:?} kind={}",
                h.name,
                h.tier,
                kind.as_str()
            );
        }

        ParsedIntent::new(
            query,
            Intent::Weather(kind),
            hit.map(|h| h.name),
            confidence,
            ResolverTag::EntityExtractor,
        )
    }
}

impl Resolver for EntityExtractor {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn resolve(&self, query: &str, vocabulary: &Vocabulary) -> Option<ParsedIntent> {
        Some(self.extract(query, vocabulary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary::default()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_named_entity_tier() {
        let hit = extract_location("Is it cold in Reykjavik?", &vocabulary()).unwrap();
        assert_eq!(hit.name, "Reykjavik");
        assert_eq!(hit.tier, ExtractionTier::NamedEntity);
    }

    #[test]
    fn test_proper_noun_tier_skips_stoplist() {
        let hit = extract_location("Forecast Springfield", &vocabulary()).unwrap();
        assert_eq!(hit.name, "Springfield");
        assert_eq!(hit.tier, ExtractionTier::ProperNoun);

        let hit = extract_location("What about Tomorrow and Ljubljanka", &vocabulary()).unwrap();
        assert_eq!(hit.name, "Ljubljanka");
    }

    #[test]
    fn test_proper_noun_tier_skips_trigger_words() {
        let v = vocabulary();
        for query in [
            "Humidity today",
            "Rain tomorrow?",
            "Windy out?",
            "Snowing yet",
            "Sunny this weekend?",
            "Best beaches",
            "Lakes nearby",
        ] {
            assert!(extract_location(query, &v).is_none(), "{:?}", query);
        }

        // Learned phrases are excluded too.
        let mut learned = vocabulary();
        learned.extend(WEATHER, ["hail"]);
        assert!(extract_location("Hail later", &v).is_some());
        assert!(extract_location("Hail later", &learned).is_none());

        // A real place next to a trigger word is still found.
        let hit = extract_location("Rain Springfield", &v).unwrap();
        assert_eq!(hit.name, "Springfield");
    }

    #[test]
    fn test_no_location() {
        assert!(extract_location("will it rain later", &vocabulary()).is_none());
    }

    #[test]
    fn test_weather_groups_priority() {
        assert_eq!(
            tag_weather("hot and windy"),
            Some(WeatherKind::Temperature)
        );
        assert_eq!(tag_weather("is it raining"), Some(WeatherKind::Precipitation));
        assert_eq!(tag_weather("how humid is it"), Some(WeatherKind::Humidity));
        assert_eq!(tag_weather("gusty out there"), Some(WeatherKind::Wind));
        assert_eq!(tag_weather("Paris"), None);
    }

    #[test]
    fn test_confidence_ladder() {
        let e = EntityExtractor;
        let v = vocabulary();

        let parsed = e.extract("Weather in Paris", &v);
        assert_eq!(parsed.location.as_deref(), Some("Paris"));
        assert_eq!(parsed.intent, Intent::Weather(WeatherKind::CurrentWeather));
        assert!(approx(parsed.confidence, 0.9), "0.8 + 0.2 capped at 0.9");

        let parsed = e.extract("Springfield", &v);
        assert_eq!(parsed.intent, Intent::Weather(WeatherKind::GeneralWeather));
        assert!(approx(parsed.confidence, 0.6));

        let parsed = e.extract("wind speed please", &v);
        assert_eq!(parsed.location, None);
        assert_eq!(parsed.intent, Intent::Weather(WeatherKind::Wind));
        assert!(approx(parsed.confidence, 0.7), "0.5 default + 0.2");

        let parsed = e.extract("hello there", &v);
        assert_eq!(parsed.location, None);
        assert!(approx(parsed.confidence, 0.5));
    }
}
