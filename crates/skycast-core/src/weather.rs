// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use log::{debug, warn};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use skycast_lexicon::WeatherKind;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

fn default_source() -> String {
    "remote".to_string()
}

/// Result of one single-location weather lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub location: String,
    #[serde(default)]
    pub temperature: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default = "default_source")]
    pub source: String,
}

impl Observation {
    pub fn succeeded(
        location: impl Into<String>,
        temperature: Option<String>,
        condition: Option<String>,
    ) -> Self {
        Self {
            location: location.into(),
            temperature,
            condition,
            success: true,
            error: None,
            source: default_source(),
        }
    }

    pub fn failed(location: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            temperature: None,
            condition: None,
            success: false,
            error: Some(error.into()),
            source: default_source(),
        }
    }
}

/// Single-location weather fetch. Implementations report failure inside the
/// returned [`Observation`] rather than as an error.
pub trait WeatherLookup: Send + Sync {
    fn lookup(
        &self,
        location: &str,
        kind: WeatherKind,
    ) -> impl Future<Output = Observation> + Send;
}

#[derive(Debug, Serialize)]
struct WeatherRequest<'a> {
    location: &'a str,
    intent: &'a str,
}

/// Posts `{location, intent}` to the scraping service and remembers
/// successful answers for a while.
pub struct HttpWeatherClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    ttl: Duration,
    cache: Mutex<LruCache<String, (Instant, Observation)>>,
}

impl HttpWeatherClient {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        ttl: Duration,
        capacity: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            client,
            url: url.into(),
            timeout,
            ttl,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    fn cached(&self, key: &str) -> Option<Observation> {
        let mut cache = self.cache.lock().ok()?;
        let (stored_at, observation) = cache.get(key)?;
        if stored_at.elapsed() < self.ttl {
            let mut observation = observation.clone();
            observation.source = "cache".to_string();
            return Some(observation);
        }
        cache.pop(key);
        None
    }

    fn remember(&self, key: String, observation: &Observation) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, (Instant::now(), observation.clone()));
        }
    }

    async fn fetch(&self, location: &str, kind: WeatherKind) -> Result<Observation, String> {
        let request = WeatherRequest {
            location,
            intent: kind.as_str(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    format!("timed out after {}s", self.timeout.as_secs())
                } else {
                    format!("request failed: {}", e)
                }
            })?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let mut observation: Observation = response
            .json()
            .await
            .map_err(|e| format!("invalid response: {}", e))?;
        if observation.error.as_deref().is_some_and(str::is_empty) {
            observation.error = None;
        }
        if observation.location.is_empty() {
            observation.location = location.to_string();
        }
        Ok(observation)
    }
}

impl WeatherLookup for HttpWeatherClient {
    async fn lookup(&self, location: &str, kind: WeatherKind) -> Observation {
        let key = location.trim().to_lowercase();
        if let Some(observation) = self.cached(&key) {
            debug!("[Weather] Cache hit location={}", location);
            return observation;
        }

        match self.fetch(location, kind).await {
            Ok(observation) => {
                debug!(
                    "[Weather] Lookup location={} success={} temperature={:?} condition={:?}",
                    location, observation.success, observation.temperature, observation.condition
                );
                if observation.success {
                    self.remember(key, &observation);
                }
                observation
            }
            Err(error) => {
                warn!("[Weather] Lookup failed location={} error={}", location, error);
                Observation::failed(location, error)
            }
        }
    }
}
