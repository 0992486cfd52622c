//! Unit tests for the Twitch adapter
//!
//! Tests are organized by component; `support` holds shared fakes.
