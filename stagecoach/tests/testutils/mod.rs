//! Test utilities for Stagecoach integration tests
//!
//! - fakes: recording collaborators (metadata, planner, launcher, node client)
//! - TestFixture: a coordinator wired to the fakes with a mutable session

#![allow(dead_code)]

pub mod fakes;
pub mod statements;
pub mod test_fixture;
