//! Integration Tests Module
//!
//! End-to-end tests for the coaching service: suggestion caching, goal
//! breakdown with backfill, daily evaluation parsing, and the Groq provider
//! driven over HTTP.


// Coaching service pipeline tests
mod coach_test;

// Groq provider over a mock HTTP server
mod groq_http_test;

// Journal files and configuration loading
mod journal_config_test;
