use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const OPENAI_MODERATION: &str = "openai_moderation";
pub const KEYWORDS: &str = "keywords";
pub const API: &str = "api";

/// Which moderation backend a config targets.
///
/// The three system providers are always available. Anything else is a
/// code-based extension whose key comes from the provider catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderType {
    OpenAiModeration,
    Keywords,
    Api,
    Extension(String),
}

impl ProviderType {
    pub fn system() -> [ProviderType; 3] {
        [
            ProviderType::OpenAiModeration,
            ProviderType::Keywords,
            ProviderType::Api,
        ]
    }

    pub fn key(&self) -> &str {
        match self {
            ProviderType::OpenAiModeration => OPENAI_MODERATION,
            ProviderType::Keywords => KEYWORDS,
            ProviderType::Api => API,
            ProviderType::Extension(key) => key,
        }
    }

    pub fn is_system(&self) -> bool {
        !matches!(self, ProviderType::Extension(_))
    }
}

impl Default for ProviderType {
    fn default() -> Self {
        ProviderType::Keywords
    }
}

impl From<String> for ProviderType {
    fn from(key: String) -> Self {
        match key.as_str() {
            OPENAI_MODERATION => ProviderType::OpenAiModeration,
            KEYWORDS => ProviderType::Keywords,
            API => ProviderType::Api,
            _ => ProviderType::Extension(key),
        }
    }
}

impl From<&str> for ProviderType {
    fn from(key: &str) -> Self {
        ProviderType::from(key.to_string())
    }
}

impl From<ProviderType> for String {
    fn from(provider: ProviderType) -> Self {
        match provider {
            ProviderType::Extension(key) => key,
            other => other.key().to_string(),
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inputs,
    Outputs,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inputs => write!(f, "inputs"),
            Direction::Outputs => write!(f, "outputs"),
        }
    }
}

/// Moderation behaviour for one direction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_response: Option<String>,
}

impl ContentConfig {
    pub fn enabled_with(preset_response: impl Into<String>) -> Self {
        Self {
            enabled: true,
            preset_response: Some(preset_response.into()),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn has_preset_response(&self) -> bool {
        self.preset_response
            .as_deref()
            .is_some_and(|response| !response.is_empty())
    }
}

/// Provider-specific settings held by the editor's working copy.
///
/// Fields declared by an extension's form schema land in `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawModerationConfigs")]
pub struct ModerationConfigs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs_configs: Option<ContentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs_configs: Option<ContentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_based_extension_id: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RawModerationConfigs {
    #[serde(default)]
    inputs_configs: Option<ContentConfig>,
    #[serde(default)]
    outputs_configs: Option<ContentConfig>,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default)]
    api_based_extension_id: Option<String>,
    #[serde(flatten)]
    fields: BTreeMap<String, serde_json::Value>,
}

impl From<RawModerationConfigs> for ModerationConfigs {
    fn from(raw: RawModerationConfigs) -> Self {
        let fields = raw
            .fields
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::String(text) => Some((name, text)),
                other => {
                    log::debug!("Dropping non-string moderation field {}: {}", name, other);
                    None
                }
            })
            .collect();

        Self {
            inputs_configs: raw.inputs_configs,
            outputs_configs: raw.outputs_configs,
            keywords: raw.keywords,
            api_based_extension_id: raw.api_based_extension_id,
            fields,
        }
    }
}

impl ModerationConfigs {
    pub fn content_config(&self, direction: Direction) -> Option<&ContentConfig> {
        match direction {
            Direction::Inputs => self.inputs_configs.as_ref(),
            Direction::Outputs => self.outputs_configs.as_ref(),
        }
    }

    /// Value of a named field, looking at the typed slots first.
    ///
    /// A schema variable sharing a typed slot's name is read from `fields`
    /// when the slot is empty.
    pub fn value(&self, name: &str) -> Option<&str> {
        let typed = match name {
            KEYWORDS => self.keywords.as_deref(),
            "api_based_extension_id" => self.api_based_extension_id.as_deref(),
            _ => None,
        };
        typed.or_else(|| self.fields.get(name).map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModerationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub provider: ProviderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configs: Option<ModerationConfigs>,
}

impl ModerationConfig {
    pub fn new(provider: impl Into<ProviderType>) -> Self {
        Self {
            enabled: true,
            provider: provider.into(),
            configs: None,
        }
    }

    pub fn content_config(&self, direction: Direction) -> Option<&ContentConfig> {
        self.configs
            .as_ref()
            .and_then(|configs| configs.content_config(direction))
    }

    pub fn is_direction_enabled(&self, direction: Direction) -> bool {
        self.content_config(direction)
            .is_some_and(|config| config.enabled)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.configs.as_ref().and_then(|configs| configs.value(name))
    }
}

/// The normalized config handed to the persistence sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistableConfig {
    #[serde(rename = "type")]
    pub provider: ProviderType,
    pub enabled: bool,
    pub configs: PersistableConfigs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistableConfigs {
    pub inputs_configs: ContentConfig,
    pub outputs_configs: ContentConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_based_extension_id: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl PersistableConfigs {
    pub fn content_config(&self, direction: Direction) -> &ContentConfig {
        match direction {
            Direction::Inputs => &self.inputs_configs,
            Direction::Outputs => &self.outputs_configs,
        }
    }
}

impl From<PersistableConfig> for ModerationConfig {
    fn from(config: PersistableConfig) -> Self {
        let PersistableConfigs {
            inputs_configs,
            outputs_configs,
            keywords,
            api_based_extension_id,
            fields,
        } = config.configs;

        ModerationConfig {
            enabled: config.enabled,
            provider: config.provider,
            configs: Some(ModerationConfigs {
                inputs_configs: Some(inputs_configs),
                outputs_configs: Some(outputs_configs),
                keywords,
                api_based_extension_id,
                fields,
            }),
        }
    }
}
