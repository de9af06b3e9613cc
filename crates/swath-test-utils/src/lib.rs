//! Test utilities for swath development.
//!
//! [`schemas`] holds the fixed schemas the unit and integration tests
//! share; [`strategies`] generates arbitrary ones for property tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod schemas;
pub mod strategies;
