//! Client-side error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The selected path cannot be imported at all; no read is attempted.
    #[error("Cannot import {}: {reason}. Importing requires a readable regular CSV file.", .path.display())]
    Capability { path: PathBuf, reason: String },

    /// The file passed the pre-checks but could not be read.
    #[error("Unable to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
