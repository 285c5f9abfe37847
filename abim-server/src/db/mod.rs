//! Database access layer for abim-server.

pub mod audit_firms;
pub mod auditees;
pub mod engagements;
pub mod taxonomy;
