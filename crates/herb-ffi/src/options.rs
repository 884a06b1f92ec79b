//! Option normalization
//!
//! Hosts hand over loosely typed option sets. Each recognized key may come
//! in two forms: a textual key (a string) or a symbolic one (a keyword
//! argument, a JS symbol). The textual form is looked up first and the
//! symbolic form only when the textual one is absent.

use std::collections::BTreeMap;

use herb_core::{ExtractRubyOptions, ParserOptions};
use serde_json::Value;
use tracing::trace;

/// The two spellings a host may use for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyForm {
    Textual,
    Symbolic,
}

/// Keys the normalizer recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    TrackWhitespace,
    Analyze,
    Strict,
    Semicolons,
    Comments,
    PreservePositions,
}

impl OptionKey {
    pub const PARSER: [OptionKey; 3] = [OptionKey::TrackWhitespace, OptionKey::Analyze, OptionKey::Strict];
    pub const EXTRACT: [OptionKey; 3] = [OptionKey::Semicolons, OptionKey::Comments, OptionKey::PreservePositions];

    pub fn name(self) -> &'static str {
        match self {
            OptionKey::TrackWhitespace => "track_whitespace",
            OptionKey::Analyze => "analyze",
            OptionKey::Strict => "strict",
            OptionKey::Semicolons => "semicolons",
            OptionKey::Comments => "comments",
            OptionKey::PreservePositions => "preserve_positions",
        }
    }
}

/// A host-supplied option set
pub trait OptionSource {
    /// Truth value of `key` in the given form; `None` when absent
    fn lookup(&self, key: &str, form: KeyForm) -> Option<bool>;
}

impl<S: OptionSource + ?Sized> OptionSource for &S {
    fn lookup(&self, key: &str, form: KeyForm) -> Option<bool> {
        (**self).lookup(key, form)
    }
}

/// Resolve one key, textual form first
pub fn fetch<S: OptionSource + ?Sized>(source: &S, key: OptionKey) -> Option<bool> {
    source
        .lookup(key.name(), KeyForm::Textual)
        .or_else(|| source.lookup(key.name(), KeyForm::Symbolic))
}

/// Build parser options from an optional host option set
///
/// `track_whitespace` only ever switches on and `analyze` only ever
/// switches off; `strict` takes whatever value is present.
pub fn normalize_parser_options<S: OptionSource + ?Sized>(options: Option<&S>) -> ParserOptions {
    let mut config = ParserOptions::DEFAULT;
    let Some(options) = options else {
        return config;
    };

    if fetch(options, OptionKey::TrackWhitespace) == Some(true) {
        config.track_whitespace = true;
    }
    if fetch(options, OptionKey::Analyze) == Some(false) {
        config.analyze = false;
    }
    if let Some(strict) = fetch(options, OptionKey::Strict) {
        config.strict = strict;
    }

    trace!(?config, "normalized parser options");
    config
}

/// Build extraction options over `baseline`; every present key overrides
pub fn normalize_extract_options<S: OptionSource + ?Sized>(
    options: Option<&S>,
    baseline: ExtractRubyOptions,
) -> ExtractRubyOptions {
    let mut config = baseline;
    let Some(options) = options else {
        return config;
    };

    if let Some(semicolons) = fetch(options, OptionKey::Semicolons) {
        config.semicolons = semicolons;
    }
    if let Some(comments) = fetch(options, OptionKey::Comments) {
        config.comments = comments;
    }
    if let Some(preserve_positions) = fetch(options, OptionKey::PreservePositions) {
        config.preserve_positions = preserve_positions;
    }

    trace!(?config, "normalized extract options");
    config
}

/// Option set backed by JSON values
///
/// Truthiness follows Ruby: `null` is absent, `false` is false and any
/// other value is true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    textual: BTreeMap<String, Value>,
    symbolic: BTreeMap<String, Value>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any previous value for the same key and form
    pub fn with(mut self, form: KeyForm, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(form, key, value);
        self
    }

    pub fn insert(&mut self, form: KeyForm, key: impl Into<String>, value: impl Into<Value>) {
        let entries = match form {
            KeyForm::Textual => &mut self.textual,
            KeyForm::Symbolic => &mut self.symbolic,
        };
        entries.insert(key.into(), value.into());
    }

    /// Read options from a JSON document
    ///
    /// Keys spelled `":name"` are symbolic, every other key is textual. A
    /// document that is not an object yields no options.
    pub fn from_json(document: &Value) -> Self {
        let mut map = Self::new();
        if let Value::Object(entries) = document {
            for (key, value) in entries {
                match key.strip_prefix(':') {
                    Some(symbol) => map.insert(KeyForm::Symbolic, symbol, value.clone()),
                    None => map.insert(KeyForm::Textual, key.as_str(), value.clone()),
                }
            }
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.textual.is_empty() && self.symbolic.is_empty()
    }
}

impl OptionSource for OptionMap {
    fn lookup(&self, key: &str, form: KeyForm) -> Option<bool> {
        let entries = match form {
            KeyForm::Textual => &self.textual,
            KeyForm::Symbolic => &self.symbolic,
        };
        entries.get(key).and_then(truthiness)
    }
}

fn truthiness(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(*flag),
        _ => Some(true),
    }
}

/// No option set at all
pub const NO_OPTIONS: Option<&OptionMap> = None;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser(map: &OptionMap) -> ParserOptions {
        normalize_parser_options(Some(map))
    }

    #[test]
    fn test_absent_options_are_defaults() {
        assert_eq!(normalize_parser_options(NO_OPTIONS), ParserOptions::DEFAULT);
        assert_eq!(parser(&OptionMap::new()), ParserOptions::DEFAULT);
        assert_eq!(
            normalize_extract_options(NO_OPTIONS, ExtractRubyOptions::DEFAULT),
            ExtractRubyOptions::DEFAULT
        );
    }

    #[test]
    fn test_textual_and_symbolic_forms_agree() {
        let expected = ParserOptions {
            track_whitespace: true,
            ..ParserOptions::DEFAULT
        };

        let textual = OptionMap::new().with(KeyForm::Textual, "track_whitespace", true);
        let symbolic = OptionMap::new().with(KeyForm::Symbolic, "track_whitespace", true);

        assert_eq!(parser(&textual), expected);
        assert_eq!(parser(&symbolic), expected);
    }

    #[test]
    fn test_textual_form_wins() {
        let map = OptionMap::new()
            .with(KeyForm::Textual, "strict", false)
            .with(KeyForm::Symbolic, "strict", true);
        assert!(!parser(&map).strict);

        let map = OptionMap::new()
            .with(KeyForm::Textual, "semicolons", true)
            .with(KeyForm::Symbolic, "semicolons", false);
        assert!(normalize_extract_options(Some(&map), ExtractRubyOptions::DEFAULT).semicolons);
    }

    #[test]
    fn test_null_textual_value_falls_back_to_symbolic() {
        let map = OptionMap::new()
            .with(KeyForm::Textual, "strict", Value::Null)
            .with(KeyForm::Symbolic, "strict", true);
        assert!(parser(&map).strict);
    }

    #[test]
    fn test_one_way_switches() {
        let map = OptionMap::new()
            .with(KeyForm::Textual, "track_whitespace", false)
            .with(KeyForm::Textual, "analyze", true);
        assert_eq!(parser(&map), ParserOptions::DEFAULT);

        let map = OptionMap::new()
            .with(KeyForm::Textual, "analyze", false)
            .with(KeyForm::Textual, "strict", "yes");
        let options = parser(&map);
        assert!(!options.analyze);
        assert!(options.strict);
    }

    #[test]
    fn test_extract_overrides_baseline() {
        let baseline = ExtractRubyOptions {
            semicolons: true,
            comments: true,
            preserve_positions: true,
        };
        let map = OptionMap::new()
            .with(KeyForm::Symbolic, "comments", false)
            .with(KeyForm::Textual, "preserve_positions", false);

        let options = normalize_extract_options(Some(&map), baseline);
        assert!(options.semicolons);
        assert!(!options.comments);
        assert!(!options.preserve_positions);
    }

    #[test]
    fn test_from_json() {
        let map = OptionMap::from_json(&json!({"strict": true, ":track_whitespace": 1, "unknown": false}));
        let options = parser(&map);
        assert!(options.strict);
        assert!(options.track_whitespace);

        assert!(OptionMap::from_json(&json!(["strict"])).is_empty());
        assert!(OptionMap::from_json(&json!("strict")).is_empty());
    }

    #[test]
    fn test_option_key_names() {
        let names: Vec<&str> = OptionKey::PARSER.iter().chain(&OptionKey::EXTRACT).map(|k| k.name()).collect();
        assert_eq!(
            names,
            ["track_whitespace", "analyze", "strict", "semicolons", "comments", "preserve_positions"]
        );
    }
}
