//! Core data structures for the pack engine.

pub mod agent;
pub mod environment;
pub mod pack;
pub mod vector;
