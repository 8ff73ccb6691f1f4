//! Encrypted messaging integration tests

mod gift_wrap_tests;
mod nip44_tests;
