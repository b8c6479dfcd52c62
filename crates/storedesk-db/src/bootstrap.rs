//! Native client library bootstrap for the analytics store

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DbError;

/// Where to find the vendor client libraries the analytics driver loads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeClientSettings {
    pub enabled: bool,
    pub windows_lib_dir: PathBuf,
    pub linux_lib_dir: PathBuf,
}

impl Default for NativeClientSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            windows_lib_dir: PathBuf::from(r"C:\oracle\instantclient_23_9"),
            linux_lib_dir: PathBuf::from("/home/ubuntu/oracle_client/instantclient_23_26"),
        }
    }
}

impl NativeClientSettings {
    /// Library directory for the platform we are running on
    pub fn lib_dir(&self) -> &Path {
        if cfg!(windows) {
            &self.windows_lib_dir
        } else {
            &self.linux_lib_dir
        }
    }
}

/// Verify the client libraries are in place.
///
/// Returns the resolved directory, or `None` when the bootstrap is disabled.
pub async fn bootstrap_native_client(
    settings: &NativeClientSettings,
) -> Result<Option<PathBuf>, DbError> {
    if !settings.enabled {
        debug!("Native client bootstrap disabled");
        return Ok(None);
    }

    let dir = settings.lib_dir();
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {
            info!("Native client libraries found at {}", dir.display());
            Ok(Some(dir.to_path_buf()))
        }
        Ok(_) => Err(DbError::ClientBootstrapFailed(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(e) => Err(DbError::ClientBootstrapFailed(format!(
            "{}: {}",
            dir.display(),
            e
        ))),
    }
}
