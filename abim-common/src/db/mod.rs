//! Database access shared across the importer services.

pub mod init;

pub use init::{create_all_tables, init_database};
