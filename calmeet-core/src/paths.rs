//! Locations of calmeet's files.
//!
//! Everything lives in one directory, by default:
//!   ~/.config/calmeet/credentials.json   (OAuth client, downloaded from Google)
//!   ~/.config/calmeet/token.toml         (access/refresh token, written by calmeet)

use std::path::{Path, PathBuf};

use crate::error::{CalmeetError, CalmeetResult};

const APP_DIR_NAME: &str = "calmeet";
const CREDENTIALS_FILE: &str = "credentials.json";
const TOKEN_FILE: &str = "token.toml";

#[derive(Debug, Clone)]
pub struct AppPaths {
    dir: PathBuf,
}

impl AppPaths {
    /// Use `dir` if given, otherwise the platform config directory.
    pub fn resolve(dir: Option<PathBuf>) -> CalmeetResult<Self> {
        match dir {
            Some(dir) => Ok(AppPaths { dir }),
            None => Self::default_dir().map(|dir| AppPaths { dir }),
        }
    }

    fn default_dir() -> CalmeetResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or(CalmeetError::NoConfigDir)?
            .join(APP_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    pub fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_is_used_verbatim() {
        let paths = AppPaths::resolve(Some(PathBuf::from("/tmp/calmeet-test"))).unwrap();

        assert_eq!(paths.dir(), Path::new("/tmp/calmeet-test"));
        assert_eq!(
            paths.credentials_path(),
            PathBuf::from("/tmp/calmeet-test/credentials.json")
        );
        assert_eq!(paths.token_path(), PathBuf::from("/tmp/calmeet-test/token.toml"));
    }
}
