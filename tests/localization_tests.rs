//! # Localization Tests
//!
//! Message retrieval and formatting for the bundled languages.

use slavic_oracle::localization::{t_args_lang, t_lang, LocalizationManager, DEFAULT_LANGUAGE};
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        assert_eq!(manager.get_message_in_language("button-draw-card", "ru", None), "Взять карту");
        assert_eq!(manager.get_message_in_language("button-draw-card", "en", None), "Draw a card");
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "en", None);
        assert_eq!(message, "Missing translation: nonexistent-key");
    }

    #[test]
    fn test_get_message_unsupported_language() {
        let manager = setup_localization();

        assert!(!manager.supports("de"));
        let message = manager.get_message_in_language("main-menu-name", "de", None);
        // Falls back to Russian
        assert_eq!(message, "Главное меню");
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("count", "42");
        let message = manager.get_message_in_language("about-deck", "en", Some(&args));
        assert!(message.contains("42 cards"));
        // No bidi isolation marks around arguments
        assert!(!message.contains('\u{2068}'));

        let message = manager.get_message_with_args("about-deck", "ru", &[("count", "7")]);
        assert!(message.contains("7 карт"));
    }

    #[test]
    fn test_back_prefix_keeps_trailing_space() {
        assert_eq!(t_lang("button-back-prefix", Some("en")), "Back to ");
        assert_eq!(t_lang("button-back-prefix", Some("ru")), "Назад: ");
    }

    #[test]
    fn test_global_helpers_default_language() {
        assert_eq!(DEFAULT_LANGUAGE, "ru");
        assert_eq!(t_lang("farewell", None), t_lang("farewell", Some("ru")));
        assert!(t_args_lang("about-deck", &[("count", "3")], None).contains('3'));
    }

    #[test]
    fn test_every_key_exists_in_both_languages() {
        let manager = setup_localization();
        let keys = [
            "main-menu-name",
            "main-menu-welcome",
            "button-draw-card",
            "button-draw-another",
            "button-back-prefix",
            "button-about",
            "about-deck",
            "retry-notice",
            "farewell",
            "keywords-label",
        ];

        for language in ["ru", "en"] {
            assert!(manager.supports(language));
            for key in keys {
                let message = manager.get_message_in_language(key, language, None);
                assert!(!message.starts_with("Missing"), "{language}: {key}");
            }
        }
    }
}
