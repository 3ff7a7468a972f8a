use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::moderation::dto::{ContentConfig, Direction, PersistableConfig, ProviderType};
use crate::moderation::error::RuntimeError;
use crate::moderation::keywords::keyword_list;
use crate::moderation::storage::ModerationSettingsManager;

/// Input key the user query is checked under.
const QUERY_KEY: &str = "query__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    DirectOutput,
    Overridden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationInputsResult {
    pub flagged: bool,
    pub action: ModerationAction,
    pub preset_response: String,
    pub inputs: BTreeMap<String, String>,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationOutputsResult {
    pub flagged: bool,
    pub action: ModerationAction,
    pub preset_response: String,
    pub text: String,
}

pub trait Moderation {
    fn moderation_for_inputs(
        &self,
        inputs: &BTreeMap<String, String>,
        query: &str,
    ) -> ModerationInputsResult;

    fn moderation_for_outputs(&self, text: &str) -> ModerationOutputsResult;
}

/// Flags content containing any configured keyword, ignoring case.
pub struct KeywordsModeration {
    keywords: Vec<String>,
    inputs_config: ContentConfig,
    outputs_config: ContentConfig,
}

impl KeywordsModeration {
    pub fn new(keywords: &str, inputs_config: ContentConfig, outputs_config: ContentConfig) -> Self {
        Self {
            keywords: keyword_list(keywords).map(str::to_lowercase).collect(),
            inputs_config,
            outputs_config,
        }
    }

    fn is_violated<'a>(&self, mut values: impl Iterator<Item = &'a str>) -> bool {
        values.any(|value| {
            let value = value.to_lowercase();
            self.keywords.iter().any(|keyword| value.contains(keyword.as_str()))
        })
    }
}

impl Moderation for KeywordsModeration {
    fn moderation_for_inputs(
        &self,
        inputs: &BTreeMap<String, String>,
        query: &str,
    ) -> ModerationInputsResult {
        let mut flagged = false;
        let mut preset_response = String::new();

        if self.inputs_config.enabled {
            preset_response = self.inputs_config.preset_response.clone().unwrap_or_default();
            let query = (!query.is_empty()).then_some(query);
            flagged = self.is_violated(inputs.values().map(String::as_str).chain(query));
        }

        ModerationInputsResult {
            flagged,
            action: ModerationAction::DirectOutput,
            preset_response,
            inputs: inputs.clone(),
            query: query.to_string(),
        }
    }

    fn moderation_for_outputs(&self, text: &str) -> ModerationOutputsResult {
        let mut flagged = false;
        let mut preset_response = String::new();

        if self.outputs_config.enabled {
            preset_response = self.outputs_config.preset_response.clone().unwrap_or_default();
            flagged = self.is_violated(std::iter::once(text));
        }

        ModerationOutputsResult {
            flagged,
            action: ModerationAction::DirectOutput,
            preset_response,
            text: text.to_string(),
        }
    }
}

/// Lets disabled configs through untouched.
struct Passthrough;

impl Moderation for Passthrough {
    fn moderation_for_inputs(
        &self,
        inputs: &BTreeMap<String, String>,
        query: &str,
    ) -> ModerationInputsResult {
        ModerationInputsResult {
            flagged: false,
            action: ModerationAction::DirectOutput,
            preset_response: String::new(),
            inputs: inputs.clone(),
            query: query.to_string(),
        }
    }

    fn moderation_for_outputs(&self, text: &str) -> ModerationOutputsResult {
        ModerationOutputsResult {
            flagged: false,
            action: ModerationAction::DirectOutput,
            preset_response: String::new(),
            text: text.to_string(),
        }
    }
}

/// Builds the moderation for a stored config.
///
/// Only the keyword provider runs in-process.
pub fn moderation_for(config: &PersistableConfig) -> Result<Box<dyn Moderation>, RuntimeError> {
    if !config.enabled {
        return Ok(Box::new(Passthrough));
    }

    match &config.provider {
        ProviderType::Keywords => Ok(Box::new(KeywordsModeration::new(
            config.configs.keywords.as_deref().unwrap_or_default(),
            config.configs.content_config(Direction::Inputs).clone(),
            config.configs.content_config(Direction::Outputs).clone(),
        ))),
        other => Err(RuntimeError::Unsupported(other.to_string())),
    }
}

/// Runs an application's stored moderation config.
#[derive(Clone)]
pub struct ModerationService {
    settings: ModerationSettingsManager,
}

impl ModerationService {
    pub fn new(settings: ModerationSettingsManager) -> Self {
        Self { settings }
    }

    fn load(&self, app_id: &str) -> Result<Box<dyn Moderation>, RuntimeError> {
        let stored = self
            .settings
            .get_settings(app_id)?
            .ok_or_else(|| RuntimeError::NotConfigured(app_id.to_string()))?;
        moderation_for(&stored.config)
    }

    pub fn moderation_for_inputs(
        &self,
        app_id: &str,
        inputs: &BTreeMap<String, String>,
        query: &str,
    ) -> Result<ModerationInputsResult, RuntimeError> {
        let result = self.load(app_id)?.moderation_for_inputs(inputs, query);
        if result.flagged {
            log::info!("Inputs flagged by moderation for app {}", app_id);
        }
        Ok(result)
    }

    pub fn moderation_for_outputs(
        &self,
        app_id: &str,
        text: &str,
    ) -> Result<ModerationOutputsResult, RuntimeError> {
        let result = self.load(app_id)?.moderation_for_outputs(text);
        if result.flagged {
            log::info!("Outputs flagged by moderation for app {}", app_id);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::dto::PersistableConfigs;

    fn keywords_config(enabled: bool) -> PersistableConfig {
        PersistableConfig {
            provider: ProviderType::Keywords,
            enabled,
            configs: PersistableConfigs {
                inputs_configs: ContentConfig::enabled_with("Input blocked"),
                outputs_configs: ContentConfig::disabled(),
                keywords: Some("Spam\n\nscam\n".to_string()),
                api_based_extension_id: None,
                fields: BTreeMap::new(),
            },
        }
    }

    #[test]
    fn test_keywords_flag_inputs_case_insensitively() {
        let moderation = moderation_for(&keywords_config(true)).unwrap();
        let mut inputs = BTreeMap::new();
        inputs.insert("topic".to_string(), "weather".to_string());

        let clean = moderation.moderation_for_inputs(&inputs, "hello there");
        assert!(!clean.flagged);
        assert_eq!(clean.preset_response, "Input blocked");

        let flagged = moderation.moderation_for_inputs(&inputs, "buy SPAM now");
        assert!(flagged.flagged);
        assert_eq!(flagged.action, ModerationAction::DirectOutput);

        inputs.insert("note".to_string(), "a Scam offer".to_string());
        assert!(moderation.moderation_for_inputs(&inputs, "").flagged);
    }

    #[test]
    fn test_blank_keyword_lines_never_match() {
        let moderation = moderation_for(&keywords_config(true)).unwrap();

        let result = moderation.moderation_for_inputs(&BTreeMap::new(), "anything at all");
        assert!(!result.flagged);
    }

    #[test]
    fn test_disabled_direction_is_not_checked() {
        let moderation = moderation_for(&keywords_config(true)).unwrap();

        let result = moderation.moderation_for_outputs("pure spam");
        assert!(!result.flagged);
        assert_eq!(result.preset_response, "");
        assert_eq!(result.text, "pure spam");
    }

    #[test]
    fn test_disabled_config_passes_everything() {
        let moderation = moderation_for(&keywords_config(false)).unwrap();

        assert!(!moderation.moderation_for_inputs(&BTreeMap::new(), "spam").flagged);
    }

    #[test]
    fn test_remote_providers_are_unsupported() {
        let mut config = keywords_config(true);
        config.provider = ProviderType::Api;

        assert!(matches!(
            moderation_for(&config),
            Err(RuntimeError::Unsupported(provider)) if provider == "api"
        ));
    }

    #[test]
    fn test_service_runs_stored_config() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let settings = ModerationSettingsManager::new(&db, "seed").unwrap();
        let mut config = keywords_config(true);
        config.configs.outputs_configs = ContentConfig::enabled_with("Output hidden");
        settings.set_settings("app-1", &config).unwrap();
        let service = ModerationService::new(settings);

        let result = service.moderation_for_outputs("app-1", "this is a scam").unwrap();
        assert!(result.flagged);
        assert_eq!(result.preset_response, "Output hidden");

        assert!(matches!(
            service.moderation_for_outputs("app-2", "text"),
            Err(RuntimeError::NotConfigured(app)) if app == "app-2"
        ));
    }
}
