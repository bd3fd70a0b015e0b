use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// Which tier scales are shown. Accumulation is unaffected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DraftMethod {
    All,
    LightForge,
    HearthArena,
    /// Scores tracked but never shown
    None,
}

impl Default for DraftMethod {
    fn default() -> Self {
        DraftMethod::All
    }
}

impl DraftMethod {
    pub fn shows_lightforge(self) -> bool {
        matches!(self, DraftMethod::All | DraftMethod::LightForge)
    }

    pub fn shows_hearth_arena(self) -> bool {
        matches!(self, DraftMethod::All | DraftMethod::HearthArena)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplaySettings {
    pub draft_method: DraftMethod,
    pub normalized_lf: bool,
    /// Hide per-card scores while still tracking them
    pub learning_mode: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            draft_method: DraftMethod::All,
            normalized_lf: true,
            learning_mode: false,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<DisplaySettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            DisplaySettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn display(&self) -> DisplaySettings {
        self.data.read().map(|guard| *guard).unwrap_or_default()
    }

    pub fn update<F>(&self, apply: F) -> Result<DisplaySettings>
    where
        F: FnOnce(&mut DisplaySettings),
    {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        apply(&mut guard);
        self.persist(&guard)?;
        Ok(*guard)
    }

    fn persist(&self, data: &DisplaySettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.display(), DisplaySettings::default());
        store
            .update(|s| {
                s.draft_method = DraftMethod::HearthArena;
                s.normalized_lf = false;
            })
            .unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        let display = reopened.display();
        assert_eq!(display.draft_method, DraftMethod::HearthArena);
        assert!(!display.normalized_lf);
        assert!(!display.draft_method.shows_lightforge());
    }
}
