//! CLI command implementations.

pub mod common;
pub mod exercise;
pub mod exercises;
pub mod gates;
pub mod health;
pub mod simulate;
pub mod submit;
pub mod version;
