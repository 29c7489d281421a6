// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Request orchestration for SkyCast: the generative parser, weather lookups,
//! arbitration between resolvers, recommendation fan-out and the [`Engine`]
//! that ties them together.

pub mod arbitration;
pub mod config;
pub mod engine;
pub mod format;
pub mod generative;
pub mod recommend;
pub mod weather;

use std::path::PathBuf;

pub use config::{ConfigError, EngineConfig};
pub use engine::{AskRequest, AskResponse, ChatTurn, Engine, EngineError, Status};
pub use generative::{
    GenerativeParse, GenerativeParser, Generator, GeneratorError, KeywordUpdates, OllamaGenerator,
};
pub use recommend::{FanOutError, RecommendationResult};
pub use weather::{HttpWeatherClient, Observation, WeatherLookup};

/// Platform configuration directory, e.g. `~/.config/skycast`.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "skycast", "skycast")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
