//! Integration tests for livelist
//! These tests run a whole session against a local mock of the Helix API

pub mod test_harness;

pub mod followed_streams_test;
pub mod redirect_test;
