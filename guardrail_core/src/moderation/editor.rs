use crate::moderation::catalog::{CodeBasedExtension, Provider, ProviderCatalog};
use crate::moderation::dto::{
    ContentConfig, Direction, ModerationConfig, ModerationConfigs, PersistableConfig, ProviderType,
};
use crate::moderation::error::{EditorError, ValidationError};
use crate::moderation::keywords::{keyword_line_count, sanitize_keywords};
use crate::moderation::normalizer::normalize;
use crate::moderation::validator::{validate_all, validate_with, ValidationContext};

/// Receives the normalized config when the editor saves.
pub trait ModerationSink {
    fn save(&mut self, config: &PersistableConfig) -> anyhow::Result<()>;
}

impl<F> ModerationSink for F
where
    F: FnMut(&PersistableConfig) -> anyhow::Result<()>,
{
    fn save(&mut self, config: &PersistableConfig) -> anyhow::Result<()> {
        self(config)
    }
}

/// Working copy of one moderation config for a single open/edit/close session.
#[derive(Debug, Clone)]
pub struct ModerationEditor {
    working: ModerationConfig,
    catalog: ProviderCatalog,
    context: ValidationContext,
}

impl ModerationEditor {
    pub fn new(initial: ModerationConfig, catalog: ProviderCatalog) -> Self {
        Self {
            working: initial,
            catalog,
            context: ValidationContext::default(),
        }
    }

    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = context;
        self
    }

    pub fn config(&self) -> &ModerationConfig {
        &self.working
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Called once the catalog query completes.
    pub fn resolve_catalog(&mut self, extensions: Vec<CodeBasedExtension>) {
        self.catalog.resolve(extensions);
    }

    pub fn available_providers(&self) -> Vec<Provider> {
        self.catalog.available_providers(&self.context.locale)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.working.enabled = enabled;
    }

    /// Switches provider and clears every provider setting, including
    /// the inputs/outputs configs.
    pub fn set_provider_type(&mut self, provider: impl Into<ProviderType>) {
        self.working.provider = provider.into();
        self.working.configs = None;
    }

    pub fn set_keywords(&mut self, raw: &str) {
        self.configs_mut().keywords = Some(sanitize_keywords(raw));
    }

    pub fn keyword_line_count(&self) -> usize {
        self.working
            .value("keywords")
            .map_or(0, keyword_line_count)
    }

    pub fn set_content_config(&mut self, direction: Direction, config: ContentConfig) {
        let configs = self.configs_mut();
        match direction {
            Direction::Inputs => configs.inputs_configs = Some(config),
            Direction::Outputs => configs.outputs_configs = Some(config),
        }
    }

    pub fn set_api_extension_id(&mut self, id: impl Into<String>) {
        self.configs_mut().api_based_extension_id = Some(id.into());
    }

    /// Merges extension form values; other keys are left alone.
    pub fn set_extra_fields<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let configs = self.configs_mut();
        for (name, value) in fields {
            configs.fields.insert(name.into(), value.into());
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_with(&self.working, &self.catalog, &self.context)
    }

    pub fn validate_all(&self) -> Vec<ValidationError> {
        validate_all(&self.working, &self.catalog, &self.context)
    }

    /// Validates, normalizes and hands the result to `sink`.
    ///
    /// Nothing reaches the sink when validation fails.
    pub fn save<S: ModerationSink>(&self, sink: &mut S) -> Result<PersistableConfig, EditorError> {
        if let Err(error) = self.validate() {
            log::debug!("Moderation config for {} rejected: {}", self.working.provider, error);
            return Err(error.into());
        }

        let normalized = normalize(&self.working, &self.catalog);
        sink.save(&normalized).map_err(EditorError::Sink)?;
        log::info!("Saved moderation config for provider {}", normalized.provider);
        Ok(normalized)
    }

    /// Ends the session without emitting anything.
    pub fn cancel(self) {
        log::debug!("Moderation edit for {} cancelled", self.working.provider);
    }

    fn configs_mut(&mut self) -> &mut ModerationConfigs {
        self.working.configs.get_or_insert_with(ModerationConfigs::default)
    }
}
