//! abim-client library — CSV ingest driver.
//!
//! Reads a CSV file of audited bodies, parses it into rows, and submits
//! one row per request to the import service with a fixed stagger between
//! submission starts.

pub mod error;
pub mod ingest;
pub mod submit;
