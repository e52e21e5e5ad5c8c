//! Common library for the CourseHub backend
//!
//! This crate provides shared infrastructure used by the API service:
//! database connectivity, configuration, and error handling.

pub mod database;
pub mod error;
