//! Secret wrapper for sensitive values
//!
//! Client secrets, authorization codes, PKCE verifiers and refresh tokens all
//! pass through this type so that `{:?}` in a log line can never print them.

use std::fmt;
use std::path::Path;
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Sensitive value - redacted in Debug/Display/logs, zeroized on drop
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the inner value (use sparingly)
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl Secret<String> {
    /// Read a secret from an environment variable. Unset and empty
    /// variables both yield `None`.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    /// Read a secret from a mounted file, trimming surrounding whitespace.
    /// A whitespace-only file yields `None`.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        let mut raw = std::fs::read_to_string(path).map_err(|source| Error::CredentialFile {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = raw.trim().to_owned();
        raw.zeroize();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::new(trimmed)))
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_are_redacted() {
        let secret = Secret::new(String::from("GOCSPX-abc123"));
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
        assert_eq!(secret.expose(), "GOCSPX-abc123");
    }

    #[test]
    fn from_file_trims_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client_secret");
        std::fs::write(&path, "GOCSPX-from-file\n").unwrap();

        let secret = Secret::from_file(&path).unwrap().unwrap();
        assert_eq!(secret.expose(), "GOCSPX-from-file");
    }

    #[test]
    fn from_file_whitespace_only_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client_secret");
        std::fs::write(&path, "  \n\t ").unwrap();

        assert!(Secret::from_file(&path).unwrap().is_none());
    }

    #[test]
    fn from_file_missing_reports_path() {
        let err = Secret::from_file(Path::new("/nonexistent/secret")).unwrap_err();
        assert!(
            matches!(err, Error::CredentialFile { ref path, .. } if path == Path::new("/nonexistent/secret")),
            "got: {err:?}"
        );
    }

    #[test]
    fn from_env_ignores_unset_variable() {
        assert!(Secret::from_env("TOKEN_RELAY_TEST_SURELY_UNSET_VAR").is_none());
    }

    #[test]
    fn clone_keeps_value() {
        let secret = Secret::new(String::from("1//refresh"));
        let copy = secret.clone();
        drop(secret);
        assert_eq!(copy.expose(), "1//refresh");
    }
}
