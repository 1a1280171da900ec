// SPDX-FileCopyrightText: 2022-2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::warn;

use crate::{
    error::{Error, Result},
    metadata,
};

use super::{IsPersistent, Storage};

type Entries = BTreeMap<String, String>;

/// Stores entries as a single JSON object on disk.
pub(crate) struct File {
    path: PathBuf,
}

impl File {
    /// A file of the given name in the user's data directory, if one can be
    /// determined.
    pub(crate) fn new<P: AsRef<Path>>(file: P) -> Option<Self> {
        metadata::PROJECT_DIRS.as_ref().map(|dirs| Self {
            path: dirs.data_dir().to_owned().join(file),
        })
    }

    pub(crate) fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries> {
        match fs::File::open(&self.path) {
            Ok(fp) => Ok(serde_json::from_reader::<fs::File, Entries>(fp)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads the entries about to be changed. A file that no longer parses is
    /// treated as empty, with `true` meaning it has to be rewritten.
    fn load_for_update(&self) -> Result<(Entries, bool)> {
        match self.load() {
            Err(Error::Json(e)) => {
                warn!(
                    "Discarding unreadable token file {}: {}",
                    self.path.display(),
                    e
                );
                Ok((Entries::new(), true))
            }
            other => other.map(|entries| (entries, false)),
        }
    }

    fn save(&self, entries: &Entries) -> Result<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = fs::OpenOptions::new();
        _ = options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt as _, PermissionsExt as _};

            // Only applies to new files; existing ones are tightened below.
            _ = options.mode(0o600);
            let file = options.open(&self.path)?;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
            serde_json::to_writer(file, entries)?;
        }
        #[cfg(not(unix))]
        serde_json::to_writer(options.open(&self.path)?, entries)?;
        Ok(())
    }
}

impl IsPersistent for File {
    fn is_persistent(&self) -> bool {
        true
    }
}

#[async_trait]
impl Storage for File {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (mut entries, _) = self.load_for_update()?;
        _ = entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    async fn remove(&mut self, key: &str) -> Result<()> {
        let (mut entries, corrupt) = self.load_for_update()?;
        if entries.remove(key).is_some() || corrupt {
            self.save(&entries)?;
        }
        Ok(())
    }
}
