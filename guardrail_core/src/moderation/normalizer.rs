use std::collections::BTreeMap;

use crate::moderation::catalog::ProviderCatalog;
use crate::moderation::dto::{
    ContentConfig, Direction, ModerationConfig, PersistableConfig, PersistableConfigs, ProviderType,
};

/// Projects the working copy onto the fields the selected provider owns.
///
/// Stale fields left over from another provider type are dropped.
pub fn normalize(config: &ModerationConfig, catalog: &ProviderCatalog) -> PersistableConfig {
    let content = |direction| {
        config
            .content_config(direction)
            .cloned()
            .unwrap_or_else(ContentConfig::disabled)
    };
    let owned = |name: &str| config.value(name).map(str::to_string);

    let mut configs = PersistableConfigs {
        inputs_configs: content(Direction::Inputs),
        outputs_configs: content(Direction::Outputs),
        keywords: None,
        api_based_extension_id: None,
        fields: BTreeMap::new(),
    };

    match &config.provider {
        ProviderType::Keywords => configs.keywords = owned("keywords"),
        ProviderType::Api => configs.api_based_extension_id = owned("api_based_extension_id"),
        ProviderType::OpenAiModeration => {}
        ProviderType::Extension(_) => {
            for field in catalog.schema_for(&config.provider).unwrap_or_default() {
                if let Some(value) = owned(&field.variable) {
                    configs.fields.insert(field.variable.clone(), value);
                }
            }
        }
    }

    PersistableConfig {
        provider: config.provider.clone(),
        enabled: config.enabled,
        configs,
    }
}
