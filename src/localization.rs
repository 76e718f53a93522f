//! # Localization Module
//!
//! User-facing messages in English and French, backed by Fluent. The
//! `.ftl` resources are embedded at compile time so the binary works from
//! any directory. Unknown languages fall back to English.

use anyhow::{anyhow, Result};
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

/// Language used when the requested one is not available
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages with a bundled resource file
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "fr"];

const EN_RESOURCE: &str = include_str!("../locales/en/main.ftl");
const FR_RESOURCE: &str = include_str!("../locales/fr/main.ftl");

/// Localization manager for the cookbook
pub struct LocalizationManager {
    bundles: HashMap<String, Arc<FluentBundle<FluentResource>>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every supported language loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (language, source) in [("en", EN_RESOURCE), ("fr", FR_RESOURCE)] {
            let locale: LanguageIdentifier = language.parse()?;
            let bundle = Self::create_bundle(&locale, source)?;
            bundles.insert(language.to_string(), Arc::new(bundle));
        }

        debug!("Loaded {} localization bundles", bundles.len());
        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(locale: &LanguageIdentifier, source: &str) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        // Terminal output has no use for bidi isolation marks
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid {} resource: {:?}", locale, errors))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Conflicting {} messages: {:?}", locale, errors))?;

        Ok(bundle)
    }

    fn bundle_for(&self, language: &str) -> Option<&Arc<FluentBundle<FluentResource>>> {
        self.bundles
            .get(detect_language(Some(language)))
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let fluent_args = args.map(|args| {
            FluentArgs::from_iter(args.iter().map(|(k, v)| (*k, FluentValue::from(*v))))
        });
        self.format(key, language, fluent_args.as_ref())
    }

    /// Get a localized message with simple string arguments
    pub fn message_with_args(&self, key: &str, language: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }

    /// Get a localized message whose numeric `$count` argument drives plural selection
    pub fn message_with_count(
        &self,
        key: &str,
        language: &str,
        count: usize,
        args: &[(&str, &str)],
    ) -> String {
        let mut fluent_args = FluentArgs::new();
        fluent_args.set("count", FluentValue::from(count));
        for (name, value) in args {
            fluent_args.set(*name, FluentValue::from(*value));
        }
        self.format(key, language, Some(&fluent_args))
    }

    fn format(&self, key: &str, language: &str, args: Option<&FluentArgs>) -> String {
        let Some(bundle) = self.bundle_for(language) else {
            return format!("Missing translation: {}", key);
        };

        // Fall back to English for keys the language does not define yet
        let bundle = if bundle.has_message(key) {
            bundle
        } else {
            match self.bundles.get(DEFAULT_LANGUAGE) {
                Some(english) if english.has_message(key) => english,
                _ => return format!("Missing translation: {}", key),
            }
        };

        let Some(pattern) = bundle.get_message(key).and_then(|message| message.value()) else {
            return format!("Missing value for key: {}", key);
        };

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            warn!("Formatting '{}' reported {} errors", key, errors.len());
        }
        value.into_owned()
    }
}

/// Map a language tag ("fr-CA", "en_US") to a supported language
pub fn detect_language(language: Option<&str>) -> &'static str {
    let Some(tag) = language else {
        return DEFAULT_LANGUAGE;
    };
    let primary = tag
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    SUPPORTED_LANGUAGES
        .iter()
        .find(|supported| **supported == primary)
        .copied()
        .unwrap_or(DEFAULT_LANGUAGE)
}
