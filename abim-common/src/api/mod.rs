//! API types and import-token helpers shared by client and server.

pub mod token;
pub mod types;

pub use types::{ImportFileRequest, ImportFileResponse, ImportOutcome, ImportRowRequest};
