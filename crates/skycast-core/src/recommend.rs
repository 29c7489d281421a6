// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! "Best X in Y" answers: pick a handful of candidate places, look up the
//! weather for each of them at the same time, keep whatever came back.

use crate::generative::{GenerativeParser, Generator};
use crate::weather::{Observation, WeatherLookup};
use futures::future::join_all;
use serde::Serialize;
use skycast_lexicon::vocabulary::contains_phrase;
use skycast_lexicon::{Category, ParsedIntent, WeatherKind};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FAN_OUT_LIMIT: usize = 3;

/// Countries recognised straight from the query text when no resolver
/// produced one.
pub const LITERAL_COUNTRIES: &[&str] = &["Nepal", "Switzerland", "France", "Italy", "Spain"];

/// Well-known peaks per country. Keys are lower-case; see [`mountain_peaks`].
const MOUNTAIN_PEAKS: &[(&str, &[&str])] = &[
    (
        "switzerland",
        &["Matterhorn", "Jungfrau", "Eiger", "Pilatus", "Rigi"],
    ),
    (
        "france",
        &["Mont Blanc", "Mont Ventoux", "Pic du Midi", "Chamonix", "Annecy"],
    ),
    (
        "italy",
        &["Matterhorn", "Monte Bianco", "Dolomites", "Gran Paradiso", "Monte Rosa"],
    ),
    (
        "spain",
        &["Teide", "Mulhacén", "Aneto", "Pico de Europa", "Nevado"],
    ),
    (
        "austria",
        &["Grossglockner", "Zugspitze", "Kitzbühel", "Innsbruck", "Salzburg"],
    ),
    (
        "nepal",
        &["Mount Everest", "K2", "Makalu", "Cho Oyu", "Lhotse"],
    ),
];

const UNKNOWN_COUNTRY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub category: Category,
    pub country: String,
    pub candidate_locations: Vec<String>,
    /// Successful observations only, in candidate order.
    pub observations: Vec<Observation>,
    pub at_least_one_success: bool,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FanOutError {
    #[error("Sorry, I couldn't find recommendations for {} in {country}.", .category.plural())]
    NoRecommendations { category: Category, country: String },
    #[error(
        "Sorry, I couldn't get weather data for the recommended {} in {country}.",
        .category.plural()
    )]
    NoObservations {
        category: Category,
        country: String,
        candidates: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FanOutSettings {
    /// At most this many candidates get a lookup.
    pub limit: usize,
    /// Ceiling for each individual lookup.
    pub lookup_timeout: Duration,
}

impl Default for FanOutSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FAN_OUT_LIMIT,
            lookup_timeout: Duration::from_secs(60),
        }
    }
}

/// Trims and title-cases a country name: " united  KINGDOM" becomes
/// "United Kingdom". Blank names and the "unknown" sentinel give `None`.
pub fn normalize_country(raw: &str) -> Option<String> {
    let words: Vec<String> = raw
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect();
    let name = words.join(" ");
    if name.is_empty() || name.eq_ignore_ascii_case(UNKNOWN_COUNTRY) {
        None
    } else {
        Some(name)
    }
}

/// The country of a recommendation intent, falling back to a literal country
/// name found in the original text.
pub fn resolve_country(parsed: &ParsedIntent) -> Option<String> {
    if let Some(country) = parsed.country().and_then(normalize_country) {
        return Some(country);
    }
    let lower = parsed.original_text.to_lowercase();
    LITERAL_COUNTRIES
        .iter()
        .find(|country| contains_phrase(&lower, &country.to_lowercase()))
        .map(|country| country.to_string())
}

pub fn mountain_peaks(country: &str) -> Option<&'static [&'static str]> {
    let key = country.trim().to_lowercase();
    MOUNTAIN_PEAKS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, peaks)| *peaks)
}

/// The request handed to the generator's recommend prompt.
pub fn recommendation_request(category: Category, country: &str) -> String {
    match category {
        Category::Mountain => format!("Famous mountains in {}", country),
        _ => format!("Best {} in {}", category.plural(), country),
    }
}

async fn candidates<G: Generator>(
    category: Category,
    country: &str,
    parser: &GenerativeParser<G>,
) -> Vec<String> {
    if category == Category::Mountain {
        if let Some(peaks) = mountain_peaks(country) {
            log::debug!("[FanOut] Using peak table for {}", country);
            return peaks.iter().map(|p| p.to_string()).collect();
        }
    }
    parser
        .recommend(&recommendation_request(category, country))
        .await
}

/// One lookup per candidate, all in flight together, each under its own
/// timeout. A slow or failing candidate never holds up or cancels the rest.
pub async fn observe_all<W: WeatherLookup>(
    lookup: &W,
    candidates: &[String],
    lookup_timeout: Duration,
) -> Vec<Observation> {
    let lookups = candidates.iter().map(|name| async move {
        match tokio::time::timeout(lookup_timeout, lookup.lookup(name, WeatherKind::CurrentWeather))
            .await
        {
            Ok(observation) => observation,
            Err(_) => {
                log::warn!("[FanOut] Lookup for {} timed out", name);
                Observation::failed(
                    name.as_str(),
                    format!("timed out after {}s", lookup_timeout.as_secs()),
                )
            }
        }
    });
    join_all(lookups).await
}

/// Runs a recommendation intent end to end. Partial success is success;
/// only zero candidates or zero successful lookups are errors.
pub async fn recommend<G: Generator, W: WeatherLookup>(
    parsed: &ParsedIntent,
    parser: &GenerativeParser<G>,
    lookup: &W,
    settings: FanOutSettings,
) -> Result<RecommendationResult, FanOutError> {
    let category = parsed.category().unwrap_or(Category::Place);
    let Some(country) = resolve_country(parsed) else {
        log::info!("[FanOut] No country in {:?}", parsed.original_text);
        return Err(FanOutError::NoRecommendations {
            category,
            country: UNKNOWN_COUNTRY.to_string(),
        });
    };

    let candidate_locations = candidates(category, &country, parser).await;
    if candidate_locations.is_empty() {
        return Err(FanOutError::NoRecommendations { category, country });
    }

    let chosen: Vec<String> = candidate_locations
        .iter()
        .take(settings.limit.max(1))
        .cloned()
        .collect();
    log::info!(
        "[FanOut] category={} country={} looking_up={:?}",
        category,
        country,
        chosen
    );

    let observations: Vec<Observation> = observe_all(lookup, &chosen, settings.lookup_timeout)
        .await
        .into_iter()
        .filter(|o| o.success)
        .collect();

    log::debug!(
        "[FanOut] {} of {} lookups succeeded",
        observations.len(),
        chosen.len()
    );

    if observations.is_empty() {
        return Err(FanOutError::NoObservations {
            category,
            country,
            candidates: chosen,
        });
    }

    Ok(RecommendationResult {
        category,
        country,
        candidate_locations,
        observations,
        at_least_one_success: true,
    })
}
