#![cfg(test)]

//! Unit tests use the same subscriber setup as the integration tests.

pub fn init() {
    kboot_test_support::logging::init();
}
