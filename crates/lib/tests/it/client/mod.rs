//! Client facade integration tests

mod access_tests;
mod messaging_tests;
mod timeout_tests;
