//! Message catalogue for validation errors
//!
//! Lookup order: requested language, then the default language, then the
//! key itself.

use std::collections::HashMap;

use crate::types::ErrorCode;

/// Default catalogue language
pub const DEFAULT_LANG: &str = "en";

/// Language tag such as `en` or `fr`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lang {
    code: String,
}

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl Default for Lang {
    fn default() -> Self {
        Self::new(DEFAULT_LANG)
    }
}

/// Localised message templates keyed by language then message key
#[derive(Debug, Clone)]
pub struct Messages {
    bundles: HashMap<String, HashMap<String, String>>,
}

impl Messages {
    /// Catalogue with the built-in English messages
    pub fn new() -> Self {
        let defaults = ErrorCode::all()
            .iter()
            .map(|code| (code.key().to_string(), code.default_message().to_string()))
            .collect();
        let mut bundles = HashMap::new();
        bundles.insert(DEFAULT_LANG.to_string(), defaults);
        Self { bundles }
    }

    /// Add or replace one template
    pub fn with_message(
        mut self,
        lang: &Lang,
        key: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.bundles
            .entry(lang.code().to_string())
            .or_default()
            .insert(key.into(), template.into());
        self
    }

    /// Resolve `key` for `lang` and fill `{n}` placeholders from `args`
    pub fn get(&self, lang: &Lang, key: &str, args: &[String]) -> String {
        let template = self
            .lookup(lang.code(), key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);
        format_template(template, args)
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.bundles
            .get(lang)
            .and_then(|bundle| bundle.get(key))
            .map(String::as_str)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new()
    }
}

fn format_template(template: &str, args: &[String]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |text, (i, arg)| {
            text.replace(&format!("{{{}}}", i), arg)
        })
}

// =============================================================================
// TESTS
// =============================================================================
