//! Herb Core - native ERB engine behind the herb host bindings
//!
//! This crate is the engine the bindings wrap: a lexer, a parser with an
//! optional ERB analysis pass, and Ruby/HTML extractors, together with the
//! growable containers they accumulate results in.
//!
//! # Main Components
//!
//! - **Containers**: [`HbNarray`], a type-erased growable array, and
//!   [`HbBuffer`], the text buffer built on it
//! - **Lexer**: [`lex`] produces a [`TokenList`] of plain-data tokens
//! - **Parser**: [`parse`] produces a [`DocumentNode`]
//! - **Extractors**: [`extract_ruby_to_buffer`] and [`extract_html_to_buffer`]
//!
//! # Example
//!
//! ```
//! use herb_core::{parse, ParserOptions};
//!
//! let document = parse("<p><%= title %></p>", &ParserOptions::default()).unwrap();
//! assert!(document.all_errors().is_empty());
//! ```

pub mod analyze;
pub mod ast;
pub mod error;
pub mod extract;
pub mod io;
pub mod lexer;
pub mod location;
pub mod options;
pub mod parser;
pub mod token;
pub mod util;

pub use ast::{AstError, AstErrorKind, DocumentNode, ErbKind, Node};
pub use error::{HerbError, Result};
pub use extract::{extract_html_to_buffer, extract_ruby_to_buffer};
pub use io::read_source;
pub use lexer::lex;
pub use location::{Location, Position, Range};
pub use options::{ExtractRubyOptions, ParserOptions};
pub use parser::parse;
pub use token::{Token, TokenList, TokenType};
pub use util::{HbBuffer, HbNarray, Plain};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the ERB grammar tables the lexer and analysis implement
pub const GRAMMAR_VERSION: &str = "1.1.0";
