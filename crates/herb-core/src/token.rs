//! Token records produced by the lexer
//!
//! Tokens are plain data: a kind, a byte range and a location. Their text
//! lives in the source, so anything turning tokens into owned values needs
//! the source that was lexed.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::location::{Location, Range};
use crate::util::HbNarray;

/// Token kinds
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    Whitespace,
    Newline,
    Identifier,
    Character,
    Equals,
    Quote,
    Slash,
    HtmlTagStart,
    HtmlTagStartClose,
    HtmlTagEnd,
    HtmlTagSelfClose,
    HtmlCommentStart,
    HtmlCommentEnd,
    ErbStart,
    ErbContent,
    ErbEnd,
    Eof,
}

impl TokenType {
    /// Stable external name, as exposed to host languages
    pub fn name(self) -> &'static str {
        match self {
            TokenType::Whitespace => "TOKEN_WHITESPACE",
            TokenType::Newline => "TOKEN_NEWLINE",
            TokenType::Identifier => "TOKEN_IDENTIFIER",
            TokenType::Character => "TOKEN_CHARACTER",
            TokenType::Equals => "TOKEN_EQUALS",
            TokenType::Quote => "TOKEN_QUOTE",
            TokenType::Slash => "TOKEN_SLASH",
            TokenType::HtmlTagStart => "TOKEN_HTML_TAG_START",
            TokenType::HtmlTagStartClose => "TOKEN_HTML_TAG_START_CLOSE",
            TokenType::HtmlTagEnd => "TOKEN_HTML_TAG_END",
            TokenType::HtmlTagSelfClose => "TOKEN_HTML_TAG_SELF_CLOSE",
            TokenType::HtmlCommentStart => "TOKEN_HTML_COMMENT_START",
            TokenType::HtmlCommentEnd => "TOKEN_HTML_COMMENT_END",
            TokenType::ErbStart => "TOKEN_ERB_START",
            TokenType::ErbContent => "TOKEN_ERB_CONTENT",
            TokenType::ErbEnd => "TOKEN_ERB_END",
            TokenType::Eof => "TOKEN_EOF",
        }
    }

    pub fn is_erb(self) -> bool {
        matches!(self, TokenType::ErbStart | TokenType::ErbContent | TokenType::ErbEnd)
    }
}

/// One lexed token
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenType,
    pub range: Range,
    pub location: Location,
}

impl Token {
    /// Token text, read back from the lexed source
    pub fn value<'a>(&self, source: &'a str) -> &'a str {
        self.range.slice(source)
    }
}

/// Tokens of one lexer run, in source order
#[derive(Debug)]
pub struct TokenList {
    tokens: HbNarray,
}

impl TokenList {
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            tokens: HbNarray::init_for::<Token>(capacity.max(1))?,
        })
    }

    pub(crate) fn push(&mut self, token: Token) -> Result<()> {
        // Safety: the array only ever holds `Token`s and is never read as bytes
        unsafe { self.tokens.append_unchecked(&token) }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        if index < self.tokens.len() {
            // Safety: every item was appended by `push`
            Some(unsafe { self.tokens.get_unchecked(index) })
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[Token] {
        // Safety: every item was appended by `push`
        unsafe { self.tokens.as_slice_unchecked() }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.as_slice().iter()
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
