// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::recommend::RecommendationResult;
use crate::weather::Observation;

const SENTINELS: &[&str] = &["n/a", "unavailable"];

/// A field worth printing: present, non-blank and not a placeholder.
fn usable(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| {
        !v.is_empty() && !SENTINELS.iter().any(|s| v.eq_ignore_ascii_case(s))
    })
}

fn usable_condition(value: Option<&str>) -> Option<&str> {
    usable(value).filter(|v| !v.eq_ignore_ascii_case("unknown"))
}

pub fn single(location: &str, observation: &Observation) -> String {
    let mut text = format!("Here's the weather for {}:", location);
    if let Some(temperature) = usable(observation.temperature.as_deref()) {
        text.push_str(&format!(" 🌡️ Temperature: {}", temperature));
    }
    if let Some(condition) = usable_condition(observation.condition.as_deref()) {
        text.push_str(&format!(" ☁️ Condition: {}", condition));
    }
    text
}

pub fn recommendation(result: &RecommendationResult) -> String {
    let mut lines = vec![format!(
        "Best {} in {} today:",
        result.category.plural(),
        result.country
    )];
    for observation in result.observations.iter().filter(|o| o.success) {
        let fields: Vec<&str> = [
            usable(observation.temperature.as_deref()),
            usable_condition(observation.condition.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if fields.is_empty() {
            lines.push(format!("🏙️ {}", observation.location));
        } else {
            lines.push(format!("🏙️ {}: {}", observation.location, fields.join(", ")));
        }
    }
    lines.join("\n")
}
