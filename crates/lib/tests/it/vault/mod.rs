//! Key vault integration tests

mod custody_tests;
mod persistence_tests;
