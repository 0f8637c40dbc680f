//! TrainLog - Self-Hosted Workout Logging Web Application
//!
//! A small, self-hosted web application for recording workouts and reviewing
//! the most recent entries. Persistence is a single SQLite table; the web
//! layer maps two pages onto it.

pub mod storage;
pub mod web;
pub mod workouts;

// Re-export commonly used types
pub use storage::database::{Database, DatabaseError};
pub use workouts::types::Workout;
