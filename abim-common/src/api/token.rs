//! Import token management.
//!
//! Every import request carries an anti-forgery token which must match the
//! token persisted in the settings table. An empty stored token disables
//! checking entirely, mirroring how a shared secret of zero disables API
//! auth elsewhere in this family of services.

use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::{Error, Result};

/// Settings key the token is stored under.
pub const IMPORT_TOKEN_KEY: &str = "import_token";

/// Fixed response body for a request with a missing or invalid token.
pub const TOKEN_REJECT_MESSAGE: &str = "Something looks wrong here.";

/// Load the import token from settings, generating and persisting one on
/// first use.
pub async fn load_import_token(db: &SqlitePool) -> Result<String> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(IMPORT_TOKEN_KEY)
        .fetch_optional(db)
        .await?;

    match row {
        Some((value,)) => Ok(value),
        None => initialize_import_token(db).await,
    }
}

/// Generate a fresh random token and persist it.
///
/// The token is the SHA-256 of 32 random bytes, stored and transmitted as
/// 64 hex characters.
pub async fn initialize_import_token(db: &SqlitePool) -> Result<String> {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    let token = format!("{:x}", Sha256::digest(seed));

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(IMPORT_TOKEN_KEY)
        .bind(&token)
        .execute(db)
        .await?;

    Ok(token)
}

/// Check a request token against the stored token. An empty stored token
/// disables checking.
pub fn validate_token(provided: &str, expected: &str) -> Result<()> {
    if expected.is_empty() || provided == expected {
        Ok(())
    } else {
        Err(Error::InvalidInput(TOKEN_REJECT_MESSAGE.to_string()))
    }
}
