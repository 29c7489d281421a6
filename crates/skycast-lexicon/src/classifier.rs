// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::entity::EntityExtractor;
use crate::geo::tokenize;
use crate::intent::{
    Category, Intent, ParsedIntent, ResolverTag, WeatherKind, DEFAULT_CONFIDENCE,
    EXACT_MATCH_CONFIDENCE,
};
use crate::vocabulary::{self, Vocabulary};
use regex::Regex;
use std::sync::OnceLock;

const BEACH_WORDS: &[&str] = &[
    "beach", "beaches", "coast", "coasts", "shore", "shores", "seaside", "ocean", "sea",
    "coastal",
];
const MOUNTAIN_WORDS: &[&str] = &[
    "mountain", "mountains", "peak", "peaks", "summit", "summits", "hill", "hills", "alpine",
    "hiking", "climbing",
];
const CITY_WORDS: &[&str] = &[
    "city", "cities", "town", "towns", "urban", "metropolitan", "downtown", "capital",
    "capitals",
];

/// One strategy for turning raw text into an intent. Returning `None` hands
/// the query to the next resolver in the cascade.
pub trait Resolver: Send + Sync {
    fn name(&self) -> &'static str;
    fn resolve(&self, query: &str, vocabulary: &Vocabulary) -> Option<ParsedIntent>;
}

/// Whether the query mentions one of the fixed keyword groups for `category`.
/// `Place` has no keyword group of its own and never matches here.
pub fn mentions(category: Category, query: &str) -> bool {
    let words: &[&str] = match category {
        Category::Beach => BEACH_WORDS,
        Category::Mountain => MOUNTAIN_WORDS,
        Category::City => CITY_WORDS,
        Category::Place => return false,
    };
    tokenize(query)
        .iter()
        .any(|t| words.contains(&t.to_lowercase().as_str()))
}

/// "best"/"top"/... plus the standalone word "in".
pub fn is_recommendation_request(query: &str, vocabulary: &Vocabulary) -> bool {
    let lower = query.to_lowercase();
    vocabulary.matches(vocabulary::RECOMMENDATION, &lower)
        && tokenize(&lower).iter().any(|t| *t == "in")
}

/// Keyword-priority category detection: beach, then mountain, then city,
/// then anything from the location vocabulary or a literal "place(s)".
pub fn detect_category(query: &str, vocabulary: &Vocabulary) -> Option<Category> {
    if mentions(Category::Beach, query) {
        return Some(Category::Beach);
    }
    if mentions(Category::Mountain, query) {
        return Some(Category::Mountain);
    }
    if mentions(Category::City, query) {
        return Some(Category::City);
    }
    let lower = query.to_lowercase();
    let literal_place = tokenize(&lower)
        .iter()
        .any(|t| *t == "place" || *t == "places");
    if vocabulary.matches(vocabulary::LOCATION, &lower) || literal_place {
        return Some(Category::Place);
    }
    None
}

/// The run of capitalised words following "in ", e.g. "New Zealand" in
/// "best beaches in New Zealand".
pub fn capture_country(query: &str) -> Option<String> {
    static IN_COUNTRY_RE: OnceLock<Regex> = OnceLock::new();
    let re = IN_COUNTRY_RE
        .get_or_init(|| Regex::new(r"\bin\s+(\p{Lu}\p{Ll}+(?:\s+\p{Lu}\p{Ll}+)*)").unwrap());
    re.captures(query).map(|caps| caps[1].to_string())
}

/// "Best <category> in <Country>".
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationRule;

impl Resolver for RecommendationRule {
    fn name(&self) -> &'static str {
        "recommendation"
    }

    fn resolve(&self, query: &str, vocabulary: &Vocabulary) -> Option<ParsedIntent> {
        if !is_recommendation_request(query, vocabulary) {
            return None;
        }
        let category = detect_category(query, vocabulary)?;
        // A category with no country falls through to the next resolver.
        let country = capture_country(query)?;

        log::debug!(
            "[Classifier] Recommendation category={} country={}",
            category,
            country
        );
        Some(ParsedIntent::new(
            query,
            Intent::Recommendation {
                category,
                country: Some(country),
            },
            None,
            EXACT_MATCH_CONFIDENCE,
            ResolverTag::RuleBased,
        ))
    }
}

/// "Where should I go?" style questions that need the user's location.
#[derive(Debug, Clone, Copy, Default)]
pub struct SituationalRule;

impl Resolver for SituationalRule {
    fn name(&self) -> &'static str {
        "situational"
    }

    fn resolve(&self, query: &str, vocabulary: &Vocabulary) -> Option<ParsedIntent> {
        let lower = query.to_lowercase();
        if !vocabulary.matches(vocabulary::SITUATIONAL, &lower)
            || is_recommendation_request(query, vocabulary)
        {
            return None;
        }
        Some(ParsedIntent::new(
            query,
            Intent::Situational,
            None,
            EXACT_MATCH_CONFIDENCE,
            ResolverTag::RuleBased,
        ))
    }
}

/// Ordered resolver list; the first resolver to return `Some` wins.
pub struct Cascade {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
            .with(RecommendationRule)
            .with(SituationalRule)
            .with(EntityExtractor)
    }
}

impl Cascade {
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    pub fn with(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn resolver_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub fn resolve(&self, query: &str, vocabulary: &Vocabulary) -> Option<ParsedIntent> {
        self.resolvers.iter().find_map(|resolver| {
            let parsed = resolver.resolve(query, vocabulary)?;
            log::debug!(
                "[Classifier] {} resolved intent={} location={:?} confidence={:.2}",
                resolver.name(),
                parsed.intent.label(),
                parsed.location,
                parsed.confidence
            );
            Some(parsed)
        })
    }

    /// Like [`Cascade::resolve`], but a cascade where nothing matched still
    /// yields a general-weather reading with the default confidence.
    pub fn resolve_or_default(&self, query: &str, vocabulary: &Vocabulary) -> ParsedIntent {
        self.resolve(query, vocabulary).unwrap_or_else(|| {
            ParsedIntent::new(
                query,
                Intent::Weather(WeatherKind::GeneralWeather),
                None,
                DEFAULT_CONFIDENCE,
                ResolverTag::RuleBased,
            )
        })
    }
}
