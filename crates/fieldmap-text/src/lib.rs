#![deny(unsafe_code)]

pub mod fragments;
pub mod normalize;

pub use fragments::{Fragment, Fragments, fragments, is_cjk, text_width};
pub use normalize::{normalize, strip_annotations};
