use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;
use crate::ids::normalize_str;

pub const TOKEN_ENV: &str = "HOMEBIT_TOKEN";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token must not be empty")]
    EmptyToken,
}

/// A saved bearer token and the notifications deployment that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedSession {
    token: String,
    notifications_base_url: String,
    saved_at: i64,
}

/// Bearer token store for the inbox calls.
///
/// `HOMEBIT_TOKEN` wins over the file. A saved token is only handed out for
/// the deployment it was saved against, and is dropped once that deployment
/// answers 401.
pub struct AuthStore {
    path: PathBuf,
    scope: String,
}

impl AuthStore {
    pub fn new(path: PathBuf, notifications_base_url: String) -> Self {
        Self {
            path,
            scope: scope_key(&notifications_base_url),
        }
    }

    pub fn load_token(&self) -> Result<Option<String>, AuthError> {
        if let Some(token) = env::var(TOKEN_ENV).ok().as_deref().and_then(normalize_str) {
            return Ok(Some(token));
        }
        self.saved_token()
    }

    /// The file-backed token alone, ignoring the environment override.
    pub fn saved_token(&self) -> Result<Option<String>, AuthError> {
        let Some(session) = self.read_session()? else {
            return Ok(None);
        };
        if scope_key(&session.notifications_base_url) != self.scope {
            return Ok(None);
        }
        Ok(normalize_str(&session.token))
    }

    pub fn store_token(&self, token: &str) -> Result<(), AuthError> {
        let token = normalize_str(token).ok_or(AuthError::EmptyToken)?;
        let session = SavedSession {
            token,
            notifications_base_url: self.scope.clone(),
            saved_at: chrono::Utc::now().timestamp(),
        };
        write_private(&self.path, &serde_json::to_string_pretty(&session)?)?;
        Ok(())
    }

    pub fn clear_token(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(AuthError::Io(err)),
            _ => Ok(()),
        }
    }

    /// Clears the saved token when `error` says the service rejected it.
    /// Returns whether the token was dropped.
    pub fn forget_if_rejected(&self, error: &ApiError) -> Result<bool, AuthError> {
        if !matches!(error, ApiError::Unauthorized) {
            return Ok(false);
        }
        tracing::debug!(path = %self.path.display(), "dropping rejected token");
        self.clear_token()?;
        Ok(true)
    }

    fn read_session(&self) -> Result<Option<SavedSession>, AuthError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AuthError::Io(err)),
        }
    }
}

fn scope_key(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

// Secrets directory is 0700, the file itself 0600.
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
        restrict(parent, 0o700)?;
    }
    fs::write(path, contents)?;
    restrict(path, 0o600)
}

#[cfg(unix)]
fn restrict(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
