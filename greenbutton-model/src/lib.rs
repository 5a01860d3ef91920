//! Domain types for GreenButton (ESPI) feeds: the decoded feed entries and
//! the normalized data-description tree produced from them.

pub mod domain;

pub use domain::*;
