use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::moderation::dto::ProviderType;

pub const DEFAULT_LOCALE: &str = "en-US";

/// Label text that is either a plain string or keyed by locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Picks the label for `locale`, falling back to en-US.
    pub fn resolve(&self, locale: &str) -> Option<&str> {
        match self {
            LocalizedText::Plain(text) => Some(text),
            LocalizedText::Localized(labels) => labels
                .get(locale)
                .or_else(|| labels.get(DEFAULT_LOCALE))
                .map(String::as_str),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        LocalizedText::Plain(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub variable: String,
    pub label: LocalizedText,
}

impl FormField {
    pub fn label_for(&self, locale: &str) -> String {
        self.label
            .resolve(locale)
            .unwrap_or(self.variable.as_str())
            .to_string()
    }
}

/// One record of the code-based extension query for the moderation module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBasedExtension {
    pub name: String,
    pub label: LocalizedText,
    #[serde(default)]
    pub form_schema: Option<Vec<FormField>>,
}

/// Request sent to the catalog source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub module: String,
}

impl CatalogQuery {
    pub fn moderation() -> Self {
        Self {
            module: "moderation".to_string(),
        }
    }
}

/// A selectable provider as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub key: ProviderType,
    pub name: String,
    pub form_schema: Option<Vec<FormField>>,
}

/// Result of looking a provider type up in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderLookup<'a> {
    System,
    Extension(&'a CodeBasedExtension),
    Unknown,
}

/// Code-based extensions known to the editor.
///
/// Stays `pending` until the catalog query resolves; until then only the
/// system providers are selectable.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalog {
    extensions: Option<Vec<CodeBasedExtension>>,
    index: BTreeMap<String, usize>,
}

impl ProviderCatalog {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn resolved(extensions: Vec<CodeBasedExtension>) -> Self {
        let mut catalog = Self::default();
        catalog.resolve(extensions);
        catalog
    }

    /// Parses the raw catalog query response.
    pub fn from_response_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let extensions: Vec<CodeBasedExtension> = serde_json::from_slice(bytes)?;
        Ok(Self::resolved(extensions))
    }

    pub fn resolve(&mut self, extensions: Vec<CodeBasedExtension>) {
        let mut index = BTreeMap::new();
        for (position, extension) in extensions.iter().enumerate() {
            if index.insert(extension.name.clone(), position).is_some() {
                log::warn!("Duplicate moderation extension in catalog: {}", extension.name);
            }
        }
        log::debug!("Provider catalog resolved with {} extensions", extensions.len());
        self.index = index;
        self.extensions = Some(extensions);
    }

    pub fn is_resolved(&self) -> bool {
        self.extensions.is_some()
    }

    pub fn extensions(&self) -> &[CodeBasedExtension] {
        self.extensions.as_deref().unwrap_or_default()
    }

    pub fn extension(&self, key: &str) -> Option<&CodeBasedExtension> {
        let position = *self.index.get(key)?;
        self.extensions().get(position)
    }

    pub fn lookup(&self, provider: &ProviderType) -> ProviderLookup<'_> {
        match provider {
            ProviderType::Extension(key) => match self.extension(key) {
                Some(extension) => ProviderLookup::Extension(extension),
                None => ProviderLookup::Unknown,
            },
            _ => ProviderLookup::System,
        }
    }

    pub fn schema_for(&self, provider: &ProviderType) -> Option<&[FormField]> {
        match self.lookup(provider) {
            ProviderLookup::Extension(extension) => extension.form_schema.as_deref(),
            _ => None,
        }
    }

    /// System providers first, then catalog extensions in catalog order.
    pub fn available_providers(&self, locale: &str) -> Vec<Provider> {
        let system = ProviderType::system().into_iter().map(|key| Provider {
            name: system_provider_name(&key).to_string(),
            key,
            form_schema: None,
        });

        let extensions = self.extensions().iter().map(|extension| Provider {
            key: ProviderType::from(extension.name.as_str()),
            name: extension
                .label
                .resolve(locale)
                .unwrap_or(extension.name.as_str())
                .to_string(),
            form_schema: extension.form_schema.clone(),
        });

        system.chain(extensions).collect()
    }
}

fn system_provider_name(provider: &ProviderType) -> &'static str {
    match provider {
        ProviderType::OpenAiModeration => "OpenAI Moderation",
        ProviderType::Keywords => "Keywords",
        ProviderType::Api => "API Extension",
        ProviderType::Extension(_) => "Extension",
    }
}
