// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

mod data;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Longest alias, in words, the gazetteer will try to match.
const MAX_SPAN_WORDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceKind {
    Country,
    Region,
    City,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub name: &'static str,
    pub kind: PlaceKind,
}

/// A span of the input text recognised as a known place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceMatch {
    pub place: Place,
    /// The text exactly as the user wrote it.
    pub surface: String,
}

// Built once and shared by every lookup.
static ALIAS_INDEX: OnceLock<HashMap<String, usize>> = OnceLock::new();

fn alias_index() -> &'static HashMap<String, usize> {
    ALIAS_INDEX.get_or_init(|| {
        let mut index = HashMap::new();
        for (i, (name, _, aliases)) in data::PLACES.iter().enumerate() {
            index.entry(name.to_lowercase()).or_insert(i);
            for alias in aliases.iter() {
                index.entry(alias.to_lowercase()).or_insert(i);
            }
        }
        index
    })
}

fn place_at(i: usize) -> Place {
    let (name, kind, _) = data::PLACES[i];
    Place { name, kind }
}

/// O(1) lookup of a whole string by canonical name or alias (case-insensitive).
pub fn lookup(name: &str) -> Option<Place> {
    let key = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    alias_index().get(&key).copied().map(place_at)
}

/// Splits text into word tokens, dropping punctuation but keeping
/// apostrophes and hyphens inside words.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
        .map(|t| t.trim_matches(|c| c == '\'' || c == '-'))
        .filter(|t| !t.is_empty())
        .collect()
}

fn starts_uppercase(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
}

fn all_uppercase(token: &str) -> bool {
    token.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
}

/// Finds the leftmost, longest known place mentioned in `text`.
///
/// Single words must be capitalised to count as a place ("Paris", not
/// "paris"), and aliases of three letters or fewer must be written in
/// capitals ("US", "LA"), so ordinary words like "us" never match.
/// Multi-word names match in any case.
pub fn find_place(text: &str) -> Option<PlaceMatch> {
    let tokens = tokenize(text);
    let index = alias_index();

    for start in 0..tokens.len() {
        let longest = MAX_SPAN_WORDS.min(tokens.len() - start);
        for len in (1..=longest).rev() {
            let span = &tokens[start..start + len];
            let key = span.join(" ").to_lowercase();
            let Some(&i) = index.get(&key) else {
                continue;
            };

            if len == 1 {
                let token = span[0];
                if !starts_uppercase(token) {
                    continue;
                }
                if token.chars().count() <= 3 && !all_uppercase(token) {
                    continue;
                }
            }

            return Some(PlaceMatch {
                place: place_at(i),
                surface: span.join(" "),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_alias() {
        let nyc = lookup("Big  Apple").expect("alias should resolve");
        assert_eq!(nyc.name, "New York");
        assert_eq!(nyc.kind, PlaceKind::City);
        assert_eq!(lookup("switzerland").unwrap().kind, PlaceKind::Country);
        assert!(lookup("Atlantis").is_none());
    }

    #[test]
    fn test_find_place_prefers_longest_span() {
        let m = find_place("What's the weather in Mexico City tonight?").unwrap();
        assert_eq!(m.place.name, "Mexico City");
        assert_eq!(m.surface, "Mexico City");
    }

    #[test]
    fn test_find_place_multiword_any_case() {
        let m = find_place("is it raining in new york").unwrap();
        assert_eq!(m.place.name, "New York");
    }

    #[test]
    fn test_find_place_ignores_lowercase_single_words() {
        assert!(find_place("tell us about paris").is_none());
        assert_eq!(find_place("Tell us about Paris").unwrap().place.name, "Paris");
        assert_eq!(
            find_place("Weather in the US").unwrap().place.name,
            "United States"
        );
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Weather in Paris? It's 'cold'-ish."),
            vec!["Weather", "in", "Paris", "It's", "cold'-ish"]
        );
    }
}
