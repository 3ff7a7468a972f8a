use crate::moderation::catalog::{ProviderCatalog, ProviderLookup};
use crate::moderation::dto::{ContentConfig, Direction, PersistableConfig, ProviderType};
use crate::moderation::keywords::{keyword_line_count, MAX_KEYWORD_LINES};

/// Short plain-text description of a saved moderation config.
pub fn summarize(config: &PersistableConfig, catalog: &ProviderCatalog, locale: &str) -> String {
    let status = if config.enabled { "On" } else { "Off" };
    let provider = provider_name(&config.provider, catalog, locale);

    let detail = match &config.provider {
        ProviderType::Keywords => {
            let count = config
                .configs
                .keywords
                .as_deref()
                .map_or(0, keyword_line_count);
            format!("Keywords: {}/{}", count, MAX_KEYWORD_LINES)
        }
        ProviderType::Api => format!(
            "API extension: {}",
            config
                .configs
                .api_based_extension_id
                .as_deref()
                .unwrap_or("(not set)")
        ),
        ProviderType::OpenAiModeration => "Hosted OpenAI moderation".to_string(),
        ProviderType::Extension(_) => format!("Fields set: {}", config.configs.fields.len()),
    };

    format!(
        "Moderation: {}\nProvider: {}\n{}\nInputs: {}\nOutputs: {}",
        status,
        provider,
        detail,
        describe_direction(config.configs.content_config(Direction::Inputs)),
        describe_direction(config.configs.content_config(Direction::Outputs)),
    )
}

fn provider_name(provider: &ProviderType, catalog: &ProviderCatalog, locale: &str) -> String {
    match catalog.lookup(provider) {
        ProviderLookup::Extension(extension) => extension
            .label
            .resolve(locale)
            .unwrap_or(extension.name.as_str())
            .to_string(),
        _ => catalog
            .available_providers(locale)
            .into_iter()
            .find(|candidate| &candidate.key == provider)
            .map(|candidate| candidate.name)
            .unwrap_or_else(|| provider.to_string()),
    }
}

fn describe_direction(config: &ContentConfig) -> String {
    match (config.enabled, config.preset_response.as_deref()) {
        (false, _) => "off".to_string(),
        (true, Some(response)) if !response.is_empty() => format!("on, replies \"{}\"", response),
        (true, _) => "on".to_string(),
    }
}
