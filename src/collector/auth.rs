//! Bearer token authentication for the collector.
//!
//! The collector has exactly one secret. It is loaded from the data directory at
//! startup, or generated and persisted there if missing, and is read-only for
//! the rest of the process lifetime.

use crate::domain::error::{Result, TracelogError};
use std::fmt;
use std::path::Path;

/// Authorization scheme expected in the `Authorization` header.
pub const BEARER_SCHEME: &str = "Bearer";

const MISSING_HEADER: &str = "Authorization header missing";
const INVALID_TOKEN: &str = "Invalid authentication token";

/// Where the token came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    /// Read from an existing token file.
    Loaded,
    /// Freshly generated and written to the token file.
    Generated,
}

/// The collector's shared secret.
///
/// `Debug` output never includes the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a random token (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Loads the token stored at `path`, or generates and stores a new one.
    ///
    /// Surrounding whitespace in the file is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, or exists but is
    /// empty.
    pub fn load_or_generate(path: &Path) -> Result<(Self, TokenOrigin)> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let value = contents.trim();
            if value.is_empty() {
                return Err(TracelogError::Config(format!(
                    "token file {} is empty",
                    path.display()
                )));
            }
            tracing::debug!(path = ?path, "loaded collector token");
            return Ok((Self(value.to_string()), TokenOrigin::Loaded));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let token = Self::generate();
        std::fs::write(path, &token.0)?;
        restrict_permissions(path)?;

        tracing::info!(path = ?path, "generated new collector token");
        Ok((token, TokenOrigin::Generated))
    }

    /// The raw secret, for handing to clients or showing to the operator once.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Checks an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns [`TracelogError::Unauthorized`] if the header is missing, is not
    /// a bearer credential, or carries the wrong token.
    ///
    /// # Examples
    ///
    /// ```
    /// use tracelog::collector::AuthToken;
    ///
    /// let token = AuthToken::new("s3cret");
    /// assert!(token.verify_bearer(Some("Bearer s3cret")).is_ok());
    /// assert!(token.verify_bearer(Some("Basic s3cret")).is_err());
    /// assert!(token.verify_bearer(None).is_err());
    /// ```
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<()> {
        let header = header.ok_or_else(|| TracelogError::Unauthorized(MISSING_HEADER.to_string()))?;

        let mut parts = header.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(BEARER_SCHEME), Some(candidate), None) if self.matches(candidate) => Ok(()),
            _ => Err(TracelogError::Unauthorized(INVALID_TOKEN.to_string())),
        }
    }

    /// Checks the `token` query parameter presented when a channel opens.
    ///
    /// # Errors
    ///
    /// Returns [`TracelogError::Unauthorized`] if the parameter is missing or wrong.
    pub fn verify_query(&self, token: Option<&str>) -> Result<()> {
        match token {
            Some(candidate) if self.matches(candidate) => Ok(()),
            _ => Err(TracelogError::Unauthorized(INVALID_TOKEN.to_string())),
        }
    }

    fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        expected.len() == candidate.len()
            && expected
                .iter()
                .zip(candidate)
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_must_match_exactly() {
        let token = AuthToken::new("abc-123");

        assert!(token.verify_bearer(Some("Bearer abc-123")).is_ok());
        assert!(token.verify_bearer(Some("Bearer abc-124")).is_err());
        assert!(token.verify_bearer(Some("Bearer abc-1234")).is_err());
        assert!(token.verify_bearer(Some("bearer abc-123")).is_err());
        assert!(token.verify_bearer(Some("Bearer")).is_err());
        assert!(token.verify_bearer(Some("Bearer abc-123 extra")).is_err());
    }

    #[test]
    fn missing_header_reports_missing() {
        let err = AuthToken::new("t").verify_bearer(None).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Authorization header missing");
    }

    #[test]
    fn query_token_must_be_present_and_match() {
        let token = AuthToken::new("abc");
        assert!(token.verify_query(Some("abc")).is_ok());
        assert!(token.verify_query(Some("")).is_err());
        assert!(token.verify_query(None).is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", AuthToken::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn token_is_generated_once_then_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/.token");

        let (first, origin) = AuthToken::load_or_generate(&path).unwrap();
        assert_eq!(origin, TokenOrigin::Generated);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first.secret());

        let (second, origin) = AuthToken::load_or_generate(&path).unwrap();
        assert_eq!(origin, TokenOrigin::Loaded);
        assert_eq!(first, second);
    }

    #[test]
    fn stored_token_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".token");
        std::fs::write(&path, "  from-disk\n").unwrap();

        let (token, _) = AuthToken::load_or_generate(&path).unwrap();
        assert_eq!(token.secret(), "from-disk");
    }

    #[test]
    fn empty_token_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".token");
        std::fs::write(&path, "\n").unwrap();

        let err = AuthToken::load_or_generate(&path).unwrap_err();
        assert!(matches!(err, TracelogError::Config(_)));
    }
}
