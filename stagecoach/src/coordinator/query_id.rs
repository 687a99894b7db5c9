// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query identifiers
//!
//! Ids have the form `YYYYMMDD_HHMMSS_NNNNN_xxxxx`: UTC timestamp, a counter
//! that resets every day, and a coordinator instance suffix. Ids created by
//! one coordinator sort by creation time.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_COUNTER: u32 = 99_999;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryId(String);

impl QueryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

struct GeneratorState {
    last_timestamp: String,
    day: String,
    counter: u32,
}

pub struct QueryIdGenerator {
    coordinator_id: String,
    state: Mutex<GeneratorState>,
}

impl Default for QueryIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryIdGenerator {
    pub fn new() -> Self {
        let suffix: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(5)
            .collect();
        Self::with_coordinator_id(suffix)
    }

    pub fn with_coordinator_id(coordinator_id: impl Into<String>) -> Self {
        Self {
            coordinator_id: coordinator_id.into(),
            state: Mutex::new(GeneratorState {
                last_timestamp: String::new(),
                day: String::new(),
                counter: 0,
            }),
        }
    }

    pub fn coordinator_id(&self) -> &str {
        &self.coordinator_id
    }

    pub fn create_next_query_id(&self) -> QueryId {
        let mut state = self.state.lock();
        let now = chrono::Utc::now();
        let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
        let day = now.format("%Y%m%d").to_string();

        if day != state.day {
            state.day = day;
            state.counter = 0;
        }
        if state.counter >= MAX_COUNTER {
            state.counter = 0;
        }
        // never move backwards if the wall clock does
        if timestamp > state.last_timestamp {
            state.last_timestamp = timestamp;
        }
        state.counter += 1;

        QueryId(format!(
            "{}_{:05}_{}",
            state.last_timestamp, state.counter, self.coordinator_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_id_format() {
        let generator = QueryIdGenerator::with_coordinator_id("abcde");
        let id = generator.create_next_query_id();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2], "00001");
        assert_eq!(parts[3], "abcde");
    }

    #[test]
    fn test_query_ids_are_increasing() {
        let generator = QueryIdGenerator::new();
        let ids: Vec<QueryId> = (0..100).map(|_| generator.create_next_query_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(generator.coordinator_id().len(), 5);
    }
}
