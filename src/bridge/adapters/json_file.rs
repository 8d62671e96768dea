//! Settings store persisted as a JSON file.

use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::bridge::{
    domain::Settings,
    ports::{SettingsStore, SettingsStoreError, SettingsStoreResult},
};

/// Settings store backed by a JSON file.
///
/// The file uses the plugin's camelCase schema. Writes go to a temporary
/// sibling first and are renamed into place, and all writes through one
/// store are serialised so a cursor update never loses a concurrent save.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    dir: Arc<Dir>,
    file_name: String,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileSettingsStore {
    /// Opens the store at `path`, creating missing parent directories.
    ///
    /// The file itself is created on the first save.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsStoreError::Io`] when `path` has no file name or the
    /// parent directory cannot be opened.
    pub fn open(path: &Utf8Path) -> SettingsStoreResult<Self> {
        let file_name = path.file_name().ok_or_else(|| {
            SettingsStoreError::io(std::io::Error::other("settings path must name a file"))
        })?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));

        Dir::create_ambient_dir_all(parent, ambient_authority()).map_err(SettingsStoreError::io)?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(SettingsStoreError::io)?;
        Ok(Self {
            dir: Arc::new(dir),
            file_name: file_name.to_owned(),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn read(&self) -> SettingsStoreResult<Settings> {
        let dir = Arc::clone(&self.dir);
        let file_name = self.file_name.clone();
        run_blocking(move || read_settings(&dir, &file_name)).await
    }

    async fn write(&self, settings: Settings) -> SettingsStoreResult<()> {
        let dir = Arc::clone(&self.dir);
        let file_name = self.file_name.clone();
        run_blocking(move || write_settings(&dir, &file_name, &settings)).await
    }
}

async fn run_blocking<T, F>(operation: F) -> SettingsStoreResult<T>
where
    F: FnOnce() -> SettingsStoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(SettingsStoreError::io)?
}

fn read_settings(dir: &Dir, file_name: &str) -> SettingsStoreResult<Settings> {
    let contents = match dir.read_to_string(file_name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(err) => return Err(SettingsStoreError::io(err)),
    };
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_json::from_str(&contents).map_err(SettingsStoreError::format)
}

fn write_settings(dir: &Dir, file_name: &str, settings: &Settings) -> SettingsStoreResult<()> {
    let encoded = serde_json::to_string_pretty(settings).map_err(SettingsStoreError::format)?;
    let temporary = format!(".{file_name}.tmp");
    dir.write(&temporary, encoded)
        .map_err(SettingsStoreError::io)?;
    dir.rename(&temporary, dir, file_name)
        .map_err(SettingsStoreError::io)
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self) -> SettingsStoreResult<Settings> {
        self.read().await
    }

    async fn save(&self, settings: &Settings) -> SettingsStoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write(settings.clone()).await
    }

    async fn save_sync_cursor(&self, cursor: DateTime<Utc>) -> SettingsStoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let settings = self.read().await?.with_sync_cursor(Some(cursor));
        self.write(settings).await?;
        debug!(%cursor, "persisted sync cursor");
        Ok(())
    }
}
