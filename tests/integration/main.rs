//! End-to-end tests for the generation pipeline
//!
//! Remote sites are served by wiremock; local trees live in tempfile
//! directories.

mod common;
mod local_tests;
mod pipeline_tests;
mod remote_tests;
