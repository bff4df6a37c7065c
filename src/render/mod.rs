//! Frame producers
//!
//! The recorder treats the render loop as opaque. This module provides a
//! synthetic one for the command-line front end and for smoke tests.

pub mod test_pattern;

pub use test_pattern::TestPattern;
