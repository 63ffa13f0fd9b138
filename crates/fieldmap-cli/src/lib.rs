//! Library components for the `fieldmap` command-line tool.

#![deny(unsafe_code)]

pub mod input;
pub mod logging;
