// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use skycast_lexicon::classifier::mentions;
use skycast_lexicon::intent::EXACT_MATCH_CONFIDENCE;
use skycast_lexicon::{Category, Intent, ParsedIntent, ResolverTag, WeatherKind};

pub const NO_LOCATION_SUGGESTION: &str = "Please provide your city or location";

/// What kind of place a location-less question seemed to be about. Picks the
/// follow-up suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionTopic {
    Mountain,
    Beach,
    City,
    General,
}

impl SuggestionTopic {
    pub fn detect(query: &str) -> Self {
        if mentions(Category::Mountain, query) {
            SuggestionTopic::Mountain
        } else if mentions(Category::Beach, query) {
            SuggestionTopic::Beach
        } else if mentions(Category::City, query) {
            SuggestionTopic::City
        } else {
            SuggestionTopic::General
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        let lines: [&str; 3] = match self {
            SuggestionTopic::Mountain => [
                "Tell me your location to find nearby mountains",
                "Or ask about a specific mountain (e.g., 'Weather at Everest Base Camp')",
                "Or ask about mountains in a country (e.g., 'Best mountains in Nepal')",
            ],
            SuggestionTopic::Beach => [
                "Tell me your location to find nearby beaches",
                "Or ask about a specific beach (e.g., 'Weather at Miami Beach')",
                "Or ask about beaches in a country (e.g., 'Best beaches in Spain')",
            ],
            SuggestionTopic::City => [
                "Tell me your location to find nearby cities",
                "Or ask about a specific city (e.g., 'Weather in Paris')",
                "Or ask about cities in a country (e.g., 'Best cities in Italy')",
            ],
            SuggestionTopic::General => [
                "Tell me your current location",
                "Or ask about a specific place (e.g., 'Weather in Paris')",
                "Or ask about places in a country (e.g., 'Best places in France')",
            ],
        };
        lines.iter().map(|s| s.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLocation {
    /// The user asked where to go without saying where they are.
    Situational,
    /// Nothing in the query or the request named a place.
    NoLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Hand over to the recommendation fan-out.
    Recommend(ParsedIntent),
    LocationRequired {
        reason: MissingLocation,
        parsed: ParsedIntent,
        suggestions: Vec<String>,
    },
    /// Single weather lookup. `location` is never empty.
    Lookup {
        parsed: ParsedIntent,
        location: String,
    },
}

/// Higher confidence wins; a tie goes to the rule-based reading so the same
/// inputs always give the same answer.
pub fn pick(rule: ParsedIntent, generative: ParsedIntent) -> ParsedIntent {
    if generative.confidence > rule.confidence {
        generative
    } else {
        rule
    }
}

fn user_location(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Combines the rule-based and generative readings of `query` into the next
/// step of the request.
pub fn arbitrate(
    query: &str,
    rule: ParsedIntent,
    generative: ParsedIntent,
    supplied_location: Option<&str>,
) -> Resolution {
    let supplied = user_location(supplied_location);

    if rule.intent.is_recommendation() {
        return Resolution::Recommend(rule);
    }
    if generative.intent.is_recommendation() {
        return Resolution::Recommend(generative);
    }

    if rule.intent.is_situational() || generative.intent.is_situational() {
        let situational = if rule.intent.is_situational() { rule } else { generative };
        return match supplied {
            Some(location) => {
                log::debug!("[Arbitration] Situational query answered for user location {}", location);
                Resolution::Lookup {
                    parsed: ParsedIntent::new(
                        query,
                        Intent::Weather(WeatherKind::GeneralWeather),
                        Some(location.to_string()),
                        EXACT_MATCH_CONFIDENCE,
                        ResolverTag::UserLocation,
                    ),
                    location: location.to_string(),
                }
            }
            None => Resolution::LocationRequired {
                reason: MissingLocation::Situational,
                parsed: situational,
                suggestions: SuggestionTopic::detect(query).suggestions(),
            },
        };
    }

    let winner = pick(rule, generative);
    log::debug!(
        "[Arbitration] winner={} intent={} confidence={:.2}",
        winner.resolver,
        winner.intent.label(),
        winner.confidence
    );

    let location = winner
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .or(supplied)
        .map(str::to_string);

    match location {
        Some(location) => Resolution::Lookup {
            parsed: winner,
            location,
        },
        None => Resolution::LocationRequired {
            reason: MissingLocation::NoLocation,
            parsed: winner,
            suggestions: vec![NO_LOCATION_SUGGESTION.to_string()],
        },
    }
}
