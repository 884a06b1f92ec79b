//! Shared contract of the host bindings
//!
//! Each binding implements [`HostAdapter`] with its own value construction
//! and error type; the operations below are written once against it. They
//! normalize options, run the engine and convert its result through the
//! scoped conversion protocol.

use std::path::Path;

use herb_core::{
    extract_html_to_buffer, extract_ruby_to_buffer, read_source, ExtractRubyOptions, HbBuffer, HerbError,
    GRAMMAR_VERSION, VERSION,
};
use tracing::{debug, warn};

use crate::handle::{RawDocument, RawText, RawTokens};
use crate::options::{normalize_extract_options, normalize_parser_options, OptionSource};
use crate::protocol::{convert_produced, convert_scoped};
use crate::snapshot::{LexSnapshot, ParseSnapshot};

/// Value construction for one host environment
pub trait HostAdapter {
    /// Host-owned value handed back to callers
    type Value;

    /// Host error; every engine error must fit into it
    type Error: From<HerbError>;

    /// Shown in parentheses at the end of [`version`]
    const HOST_KIND: &'static str;

    /// Name of the host package
    const PACKAGE_NAME: &'static str;

    fn package_version(&self) -> &str;

    fn token_list(&self, tokens: LexSnapshot) -> Result<Self::Value, Self::Error>;

    fn document(&self, document: ParseSnapshot) -> Result<Self::Value, Self::Error>;

    fn string(&self, text: &str) -> Result<Self::Value, Self::Error>;
}

pub fn lex<H: HostAdapter>(host: &H, source: &str) -> Result<H::Value, H::Error> {
    debug!(host = H::HOST_KIND, bytes = source.len(), "lex");
    convert_produced(
        || RawTokens::lex(source),
        |tokens| host.token_list(LexSnapshot::capture(tokens, source)),
    )
}

pub fn lex_file<H: HostAdapter>(host: &H, path: impl AsRef<Path>) -> Result<H::Value, H::Error> {
    let source = read_source(path)?;
    lex(host, &source)
}

pub fn parse<H, S>(host: &H, source: &str, options: Option<&S>) -> Result<H::Value, H::Error>
where
    H: HostAdapter,
    S: OptionSource + ?Sized,
{
    let options = normalize_parser_options(options);
    debug!(host = H::HOST_KIND, bytes = source.len(), ?options, "parse");
    convert_produced(
        || RawDocument::parse(source, &options),
        |document| host.document(ParseSnapshot::capture(document, source)),
    )
}

pub fn parse_file<H, S>(host: &H, path: impl AsRef<Path>, options: Option<&S>) -> Result<H::Value, H::Error>
where
    H: HostAdapter,
    S: OptionSource + ?Sized,
{
    let source = read_source(path)?;
    parse(host, &source, options)
}

/// Extract the Ruby code of `source`
///
/// Returns `Ok(None)` when the output buffer could not be allocated or
/// filled.
pub fn extract_ruby<H, S>(host: &H, source: &str, options: Option<&S>) -> Result<Option<H::Value>, H::Error>
where
    H: HostAdapter,
    S: OptionSource + ?Sized,
{
    let options = normalize_extract_options(options, ExtractRubyOptions::DEFAULT);
    debug!(host = H::HOST_KIND, bytes = source.len(), ?options, "extract ruby");
    extract_text(host, source, |output| extract_ruby_to_buffer(source, output, &options))
}

/// Extract the HTML of `source`, with every ERB tag blanked
pub fn extract_html<H: HostAdapter>(host: &H, source: &str) -> Result<Option<H::Value>, H::Error> {
    debug!(host = H::HOST_KIND, bytes = source.len(), "extract html");
    extract_text(host, source, |output| extract_html_to_buffer(source, output))
}

/// `"<package> v<version>, herb grammar v<grammar>, libherb v<engine> (<host>)"`
pub fn version<H: HostAdapter>(host: &H) -> String {
    format!(
        "{} v{}, herb grammar v{}, libherb v{} ({})",
        H::PACKAGE_NAME,
        host.package_version(),
        GRAMMAR_VERSION,
        VERSION,
        H::HOST_KIND
    )
}

fn extract_text<H: HostAdapter>(
    host: &H,
    source: &str,
    extract: impl FnOnce(&mut HbBuffer) -> herb_core::Result<()>,
) -> Result<Option<H::Value>, H::Error> {
    let buffer = match HbBuffer::init(source.len()) {
        Ok(buffer) => buffer,
        Err(err) => {
            warn!(%err, "could not allocate extraction buffer");
            return Ok(None);
        }
    };

    convert_scoped(
        || RawText::extract(buffer, extract),
        |text| text.map(|text| host.string(text)).transpose(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{KeyForm, OptionMap, NO_OPTIONS};

    /// Host whose values are plain Rust data
    struct PlainHost;

    #[derive(Debug, PartialEq)]
    enum Plain {
        Tokens(Vec<String>),
        Document(ParseSnapshot),
        Text(String),
    }

    impl HostAdapter for PlainHost {
        type Value = Plain;
        type Error = HerbError;

        const HOST_KIND: &'static str = "test host";
        const PACKAGE_NAME: &'static str = "herb-test";

        fn package_version(&self) -> &str {
            "9.8.7"
        }

        fn token_list(&self, tokens: LexSnapshot) -> Result<Plain, HerbError> {
            Ok(Plain::Tokens(tokens.value.into_iter().map(|t| t.kind.to_string()).collect()))
        }

        fn document(&self, document: ParseSnapshot) -> Result<Plain, HerbError> {
            Ok(Plain::Document(document))
        }

        fn string(&self, text: &str) -> Result<Plain, HerbError> {
            Ok(Plain::Text(text.to_string()))
        }
    }

    #[test]
    fn test_lex() {
        match lex(&PlainHost, "<%= x %>").unwrap() {
            Plain::Tokens(kinds) => assert_eq!(
                kinds,
                ["TOKEN_ERB_START", "TOKEN_ERB_CONTENT", "TOKEN_ERB_END", "TOKEN_EOF"]
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_honours_options() {
        let options = OptionMap::new().with(KeyForm::Symbolic, "analyze", false);
        match parse(&PlainHost, "<% end %>", Some(&options)).unwrap() {
            Plain::Document(snapshot) => assert!(snapshot.errors.is_empty()),
            other => panic!("unexpected {:?}", other),
        }

        match parse(&PlainHost, "<% end %>", NO_OPTIONS).unwrap() {
            Plain::Document(snapshot) => assert_eq!(snapshot.errors[0].kind, "UnmatchedERBEndError"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_extract() {
        let ruby = extract_ruby(&PlainHost, "<b><%= x %></b>", NO_OPTIONS).unwrap();
        assert_eq!(ruby, Some(Plain::Text("       x       ".to_string())));

        let html = extract_html(&PlainHost, "<b><%= x %></b>").unwrap();
        assert_eq!(html, Some(Plain::Text("<b>        </b>".to_string())));
    }

    #[test]
    fn test_ruby_without_markup_is_unchanged() {
        let options = OptionMap::new().with(KeyForm::Textual, "preserve_positions", false);
        let ruby = extract_ruby(&PlainHost, "<% a = 1; %>", Some(&options)).unwrap();
        assert_eq!(ruby, Some(Plain::Text("a = 1;\n".to_string())));
    }

    #[test]
    fn test_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html.erb");
        std::fs::write(&path, "<p><%= title %></p>").unwrap();

        assert!(matches!(lex_file(&PlainHost, &path).unwrap(), Plain::Tokens(_)));
        assert!(matches!(parse_file(&PlainHost, &path, NO_OPTIONS).unwrap(), Plain::Document(_)));

        let missing = dir.path().join("missing.html.erb");
        assert!(matches!(lex_file(&PlainHost, &missing), Err(HerbError::Io { .. })));
    }

    #[test]
    fn test_version() {
        let version = version(&PlainHost);
        assert_eq!(
            version,
            format!("herb-test v9.8.7, herb grammar v{}, libherb v{} (test host)", GRAMMAR_VERSION, VERSION)
        );
    }
}
