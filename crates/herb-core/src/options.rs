//! Engine options
//!
//! Both structs are `#[repr(C)]` so they cross the C ABI unchanged, and
//! deserialize with missing fields taking their documented defaults.

use serde::{Deserialize, Serialize};

/// Options for lexing/parsing
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Keep whitespace inside open tags as `Whitespace` nodes
    pub track_whitespace: bool,
    /// Run post-parse analysis of ERB control flow
    pub analyze: bool,
    /// Report elements whose closing tag HTML lets you omit
    pub strict: bool,
}

impl ParserOptions {
    pub const DEFAULT: Self = Self {
        track_whitespace: false,
        analyze: true,
        strict: false,
    };
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Options for Ruby extraction
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractRubyOptions {
    /// Terminate each extracted statement with `;`
    pub semicolons: bool,
    /// Keep ERB comments as Ruby comments
    pub comments: bool,
    /// Keep every Ruby byte at its original offset
    pub preserve_positions: bool,
}

impl ExtractRubyOptions {
    pub const DEFAULT: Self = Self {
        semicolons: false,
        comments: false,
        preserve_positions: true,
    };
}

impl Default for ExtractRubyOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParserOptions::default();
        assert!(!options.track_whitespace);
        assert!(options.analyze);
        assert!(!options.strict);

        let options = ExtractRubyOptions::default();
        assert!(!options.semicolons);
        assert!(!options.comments);
        assert!(options.preserve_positions);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let options: ParserOptions = serde_json::from_str(r#"{"strict": true}"#).unwrap();
        assert_eq!(options, ParserOptions { strict: true, ..ParserOptions::DEFAULT });

        let options: ExtractRubyOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ExtractRubyOptions::DEFAULT);
    }
}
