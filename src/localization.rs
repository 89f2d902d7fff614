use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use lazy_static::lazy_static;
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;
use anyhow::{Context, Result};
use tracing::error;

/// Language used when a requested one is not available
pub const DEFAULT_LANGUAGE: &str = "ru";

const RESOURCES: [(&str, &str); 2] = [
    ("ru", include_str!("../locales/ru/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Localization manager for the oracle bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every bundled language
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (language, source) in RESOURCES {
            let locale: LanguageIdentifier = language
                .parse()
                .with_context(|| format!("Invalid language identifier: {language}"))?;
            let bundle = Self::create_bundle(&locale, source)?;
            bundles.insert(language.to_string(), bundle);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(
        locale: &LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Telegram shows the isolation marks as garbage
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| {
                anyhow::anyhow!("Failed to parse {locale} resource: {errors:?}")
            })?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Failed to add {locale} resource: {errors:?}"))?;

        Ok(bundle)
    }

    pub fn supports(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// Get a localized message in a language, falling back to the default one
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let fluent_args = args.map(|args| {
            args.iter()
                .map(|(k, v)| (*k, FluentValue::from(*v)))
                .collect::<FluentArgs>()
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            error!(key, language, errors = ?errors, "Failed to format message");
        }

        value.into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(
        &self,
        key: &str,
        language: &str,
        args: &[(&str, &str)],
    ) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }
}

lazy_static! {
    static ref LOCALIZATION_MANAGER: Option<LocalizationManager> =
        match LocalizationManager::new() {
            Ok(manager) => Some(manager),
            Err(e) => {
                error!(error = %e, "Failed to initialize localization");
                None
            }
        };
}

/// Get the global localization manager
pub fn get_localization_manager() -> Option<&'static LocalizationManager> {
    LOCALIZATION_MANAGER.as_ref()
}

/// Convenience function to get a localized message
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    match get_localization_manager() {
        Some(manager) => {
            manager.get_message_in_language(key, language_code.unwrap_or(DEFAULT_LANGUAGE), None)
        }
        None => format!("Missing translation: {key}"),
    }
}

/// Convenience function to get a localized message with arguments
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    match get_localization_manager() {
        Some(manager) => {
            manager.get_message_with_args(key, language_code.unwrap_or(DEFAULT_LANGUAGE), args)
        }
        None => format!("Missing translation: {key}"),
    }
}
