//! Shared helpers: configuration, errors, JSON files and strings.

pub mod config;
pub mod errors;
pub mod file_handler;
pub mod string_utils;
