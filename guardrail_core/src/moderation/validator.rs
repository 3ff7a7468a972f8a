use crate::moderation::catalog::{ProviderCatalog, ProviderLookup, DEFAULT_LOCALE};
use crate::moderation::dto::{Direction, ModerationConfig, ProviderType};
use crate::moderation::error::ValidationError;

/// Host facts that validation depends on besides the config itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    pub locale: String,
    pub openai_configured: bool,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            openai_configured: true,
        }
    }
}

pub fn validate(config: &ModerationConfig, catalog: &ProviderCatalog) -> Result<(), ValidationError> {
    validate_with(config, catalog, &ValidationContext::default())
}

/// Checks the rules in order and reports the first one violated.
pub fn validate_with(
    config: &ModerationConfig,
    catalog: &ProviderCatalog,
    context: &ValidationContext,
) -> Result<(), ValidationError> {
    match violations(config, catalog, context).into_iter().next() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Every violated rule, in rule order.
pub fn validate_all(
    config: &ModerationConfig,
    catalog: &ProviderCatalog,
    context: &ValidationContext,
) -> Vec<ValidationError> {
    violations(config, catalog, context)
}

fn violations(
    config: &ModerationConfig,
    catalog: &ProviderCatalog,
    context: &ValidationContext,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.provider == ProviderType::OpenAiModeration && !context.openai_configured {
        errors.push(ValidationError::ProviderNotConfigured);
    }

    if !config.is_direction_enabled(Direction::Inputs)
        && !config.is_direction_enabled(Direction::Outputs)
    {
        errors.push(ValidationError::NoDirectionEnabled);
    }

    match &config.provider {
        ProviderType::Keywords => {
            if is_empty(config.value("keywords")) {
                errors.push(ValidationError::missing_field("keywords", "Keywords"));
            }
        }
        ProviderType::Api => {
            if is_empty(config.value("api_based_extension_id")) {
                errors.push(ValidationError::missing_field(
                    "api_based_extension_id",
                    "API Extension",
                ));
            }
        }
        ProviderType::OpenAiModeration => {}
        ProviderType::Extension(key) => match catalog.lookup(&config.provider) {
            ProviderLookup::Extension(extension) => match &extension.form_schema {
                Some(schema) => {
                    for field in schema {
                        if is_empty(config.value(&field.variable)) {
                            errors.push(ValidationError::missing_field(
                                field.variable.clone(),
                                field.label_for(&context.locale),
                            ));
                        }
                    }
                }
                None => errors.push(ValidationError::MissingFormSchema(key.clone())),
            },
            ProviderLookup::Unknown | ProviderLookup::System => {
                errors.push(ValidationError::UnknownProvider(key.clone()));
            }
        },
    }

    if config.provider != ProviderType::Api {
        for direction in [Direction::Inputs, Direction::Outputs] {
            if let Some(content) = config.content_config(direction) {
                if content.enabled && !content.has_preset_response() {
                    errors.push(ValidationError::MissingPresetResponse(direction));
                }
            }
        }
    }

    errors
}

fn is_empty(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::catalog::{CodeBasedExtension, FormField};
    use crate::moderation::dto::{ContentConfig, ModerationConfigs};

    fn dynamic_catalog() -> ProviderCatalog {
        ProviderCatalog::resolved(vec![CodeBasedExtension {
            name: "dyn-provider".to_string(),
            label: "Dynamic".into(),
            form_schema: Some(vec![
                FormField {
                    variable: "api_key".to_string(),
                    label: "API Key".into(),
                },
                FormField {
                    variable: "region".to_string(),
                    label: "Region".into(),
                },
            ]),
        }])
    }

    fn config_with(provider: &str, configs: ModerationConfigs) -> ModerationConfig {
        ModerationConfig {
            enabled: true,
            provider: ProviderType::from(provider),
            configs: Some(configs),
        }
    }

    fn inputs_enabled() -> ModerationConfigs {
        ModerationConfigs {
            inputs_configs: Some(ContentConfig::enabled_with("blocked")),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_direction_enabled() {
        let config = config_with(
            "keywords",
            ModerationConfigs {
                inputs_configs: Some(ContentConfig::disabled()),
                outputs_configs: Some(ContentConfig::disabled()),
                keywords: Some("spam".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(
            validate(&config, &ProviderCatalog::pending()),
            Err(ValidationError::NoDirectionEnabled)
        );
    }

    #[test]
    fn test_absent_configs_means_no_direction() {
        let config = ModerationConfig::new("openai_moderation");

        assert_eq!(
            validate(&config, &ProviderCatalog::pending()),
            Err(ValidationError::NoDirectionEnabled)
        );
    }

    #[test]
    fn test_keywords_required() {
        let config = config_with(
            "keywords",
            ModerationConfigs {
                keywords: Some(String::new()),
                ..inputs_enabled()
            },
        );

        let error = validate(&config, &ProviderCatalog::pending()).unwrap_err();
        assert_eq!(error.field(), Some("keywords"));
        assert_eq!(error.to_string(), "Keywords cannot be empty");
    }

    #[test]
    fn test_api_extension_required() {
        let config = config_with("api", inputs_enabled());

        let error = validate(&config, &ProviderCatalog::pending()).unwrap_err();
        assert_eq!(error.field(), Some("api_based_extension_id"));
    }

    #[test]
    fn test_api_skips_preset_response() {
        let config = config_with(
            "api",
            ModerationConfigs {
                inputs_configs: Some(ContentConfig {
                    enabled: true,
                    preset_response: None,
                }),
                api_based_extension_id: Some("ext-1".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(validate(&config, &ProviderCatalog::pending()), Ok(()));
    }

    #[test]
    fn test_schema_fields_reported_in_declaration_order() {
        let config = config_with("dyn-provider", inputs_enabled());

        let error = validate(&config, &dynamic_catalog()).unwrap_err();
        assert_eq!(error, ValidationError::missing_field("api_key", "API Key"));
    }

    #[test]
    fn test_schema_second_field_missing() {
        let mut configs = inputs_enabled();
        configs.fields.insert("api_key".to_string(), "k".to_string());
        let config = config_with("dyn-provider", configs);

        let error = validate(&config, &dynamic_catalog()).unwrap_err();
        assert_eq!(error.field(), Some("region"));
    }

    #[test]
    fn test_extension_without_form_schema_is_rejected() {
        let catalog = ProviderCatalog::resolved(vec![CodeBasedExtension {
            name: "no_schema".to_string(),
            label: "No Schema".into(),
            form_schema: None,
        }]);
        let config = config_with("no_schema", inputs_enabled());

        assert_eq!(
            validate(&config, &catalog),
            Err(ValidationError::MissingFormSchema("no_schema".to_string()))
        );
    }

    #[test]
    fn test_schema_variable_named_like_typed_slot() {
        let catalog = ProviderCatalog::resolved(vec![CodeBasedExtension {
            name: "word_list".to_string(),
            label: "Word List".into(),
            form_schema: Some(vec![FormField {
                variable: "keywords".to_string(),
                label: "K".into(),
            }]),
        }]);
        let mut configs = inputs_enabled();
        configs.fields.insert("keywords".to_string(), "abc".to_string());
        let config = config_with("word_list", configs);

        assert_eq!(validate(&config, &catalog), Ok(()));
    }

    #[test]
    fn test_unknown_extension_while_catalog_pending() {
        let config = config_with("dyn-provider", inputs_enabled());

        assert_eq!(
            validate(&config, &ProviderCatalog::pending()),
            Err(ValidationError::UnknownProvider("dyn-provider".to_string()))
        );
    }

    #[test]
    fn test_preset_response_required_per_direction() {
        let config = config_with(
            "openai_moderation",
            ModerationConfigs {
                inputs_configs: Some(ContentConfig::enabled_with("blocked")),
                outputs_configs: Some(ContentConfig::enabled_with("")),
                ..Default::default()
            },
        );

        assert_eq!(
            validate(&config, &ProviderCatalog::pending()),
            Err(ValidationError::MissingPresetResponse(Direction::Outputs))
        );
    }

    #[test]
    fn test_inputs_preset_checked_before_outputs() {
        let config = config_with(
            "openai_moderation",
            ModerationConfigs {
                inputs_configs: Some(ContentConfig::enabled_with("")),
                outputs_configs: Some(ContentConfig::enabled_with("")),
                ..Default::default()
            },
        );

        assert_eq!(
            validate(&config, &ProviderCatalog::pending()),
            Err(ValidationError::MissingPresetResponse(Direction::Inputs))
        );
    }

    #[test]
    fn test_openai_not_configured() {
        let config = config_with("openai_moderation", inputs_enabled());
        let context = ValidationContext {
            openai_configured: false,
            ..Default::default()
        };

        assert_eq!(
            validate_with(&config, &ProviderCatalog::pending(), &context),
            Err(ValidationError::ProviderNotConfigured)
        );
    }

    #[test]
    fn test_validate_all_accumulates() {
        let config = config_with(
            "dyn-provider",
            ModerationConfigs {
                inputs_configs: Some(ContentConfig::enabled_with("")),
                ..Default::default()
            },
        );

        let errors = validate_all(&config, &dynamic_catalog(), &ValidationContext::default());
        assert_eq!(
            errors,
            vec![
                ValidationError::missing_field("api_key", "API Key"),
                ValidationError::missing_field("region", "Region"),
                ValidationError::MissingPresetResponse(Direction::Inputs),
            ]
        );
    }

    #[test]
    fn test_valid_keywords_config() {
        let config = config_with(
            "keywords",
            ModerationConfigs {
                keywords: Some("spam\nscam".to_string()),
                ..inputs_enabled()
            },
        );

        assert_eq!(validate(&config, &ProviderCatalog::pending()), Ok(()));
    }
}
