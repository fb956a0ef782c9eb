//! Test Helper Utilities
//!
//! Shared utilities for banter-server integration tests

#![allow(dead_code)]

pub mod audio_generator;

pub use audio_generator::{generate_test_mp3, generate_test_wav, write_corrupt_file, ToneConfig};
