use serde::{Deserialize, Serialize};
use sled::{Db, Tree};

use crate::moderation::dto::PersistableConfig;
use crate::moderation::editor::ModerationSink;
use crate::moderation::error::StoreError;

const TREE_NAME: &str = "moderation_settings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredModeration {
    pub config: PersistableConfig,
    pub last_updated: i64, // unix timestamp
}

/// Saved moderation configs, one per application.
#[derive(Clone)]
pub struct ModerationSettingsManager {
    tree: Tree,
    account_seed: String,
}

impl ModerationSettingsManager {
    pub fn new(db: &Db, account_seed: impl Into<String>) -> sled::Result<Self> {
        let tree = db.open_tree(TREE_NAME)?;
        Ok(Self {
            tree,
            account_seed: account_seed.into(),
        })
    }

    fn format_key(&self, app_id: &str) -> String {
        format!("{}-{}", app_id, self.account_seed)
    }

    pub fn get_settings(&self, app_id: &str) -> Result<Option<StoredModeration>, StoreError> {
        match self.tree.get(self.format_key(app_id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_settings(
        &self,
        app_id: &str,
        config: &PersistableConfig,
    ) -> Result<StoredModeration, StoreError> {
        let stored = StoredModeration {
            config: config.clone(),
            last_updated: chrono::Utc::now().timestamp(),
        };
        let bytes = serde_json::to_vec(&stored)?;
        self.tree.insert(self.format_key(app_id), bytes)?;
        log::info!("Stored moderation settings for app {}", app_id);
        Ok(stored)
    }

    /// Returns whether anything was removed.
    pub fn remove_settings(&self, app_id: &str) -> Result<bool, StoreError> {
        Ok(self.tree.remove(self.format_key(app_id))?.is_some())
    }

    /// Save target for an editor session on `app_id`.
    pub fn sink(&self, app_id: impl Into<String>) -> AppModerationSink<'_> {
        AppModerationSink {
            manager: self,
            app_id: app_id.into(),
        }
    }
}

pub struct AppModerationSink<'a> {
    manager: &'a ModerationSettingsManager,
    app_id: String,
}

impl ModerationSink for AppModerationSink<'_> {
    fn save(&mut self, config: &PersistableConfig) -> anyhow::Result<()> {
        self.manager.set_settings(&self.app_id, config)?;
        Ok(())
    }
}
