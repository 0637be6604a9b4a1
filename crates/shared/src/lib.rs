//! Records and wire shapes exchanged with the SRS server.

pub mod domain;
pub mod error;
pub mod protocol;

#[cfg(test)]
#[path = "tests/wire_tests.rs"]
mod tests;
