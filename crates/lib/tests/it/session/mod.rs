//! Session guard integration tests

mod expiry_tests;
mod login_tests;
