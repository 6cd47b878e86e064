//! OAuth token persistence.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalmeetError, CalmeetResult};

/// Tokens count as expired this many seconds before `expires_at`.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Build a token from an OAuth grant. Non-positive `expires_in` means the
    /// server did not say, so the token never counts as expired.
    pub fn from_grant(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> Self {
        StoredToken {
            access_token,
            refresh_token: if refresh_token.is_empty() {
                None
            } else {
                Some(refresh_token)
            },
            expires_at: if expires_in > 0 {
                Some(now + Duration::seconds(expires_in))
            } else {
                None
            },
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| now >= at - Duration::seconds(EXPIRY_MARGIN_SECS))
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Merge a refreshed token into this one. Google usually omits the
    /// refresh token on refresh responses, so the old one is kept.
    pub fn refreshed(&self, fresh: StoredToken) -> StoredToken {
        StoredToken {
            refresh_token: fresh.refresh_token.or_else(|| self.refresh_token.clone()),
            ..fresh
        }
    }
}

/// Where the authorized token is cached between runs.
pub trait TokenStore {
    fn load(&self) -> CalmeetResult<Option<StoredToken>>;
    fn save(&self, token: &StoredToken) -> CalmeetResult<()>;
}

/// TOML file holding a single token.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the token file. Returns whether a file was there.
    pub fn clear(&self) -> CalmeetResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> CalmeetResult<Option<StoredToken>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no token file");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;

        let token = toml::from_str(&contents).map_err(|e| CalmeetError::TokenParse {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(Some(token))
    }

    fn save(&self, token: &StoredToken) -> CalmeetResult<()> {
        let contents = toml::to_string_pretty(token)
            .map_err(|e| CalmeetError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);

        // Owner-only (0600) from creation, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;

        // `mode` only applies to new files; tighten one left by an older run
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(contents.as_bytes())?;

        debug!(path = %self.path.display(), "saved token");

        Ok(())
    }
}
