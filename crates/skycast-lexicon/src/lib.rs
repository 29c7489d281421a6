// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Text side of SkyCast: intent types, the shared trigger-phrase vocabulary,
//! a small place gazetteer, and the synchronous resolvers that turn a query
//! into a [`ParsedIntent`] without touching the network.

pub mod classifier;
pub mod entity;
pub mod geo;
pub mod intent;
pub mod vocabulary;

pub use classifier::{Cascade, RecommendationRule, Resolver, SituationalRule};
pub use entity::EntityExtractor;
pub use intent::{Category, Intent, ParsedIntent, ParsedQuery, ResolverTag, WeatherKind};
pub use vocabulary::{MergeReport, Persistence, Vocabulary, VocabularyError, VocabularyStore};
