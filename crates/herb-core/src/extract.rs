//! Ruby and HTML extraction
//!
//! Both extractors write into a caller-provided [`HbBuffer`]. With position
//! preservation every byte that is not kept becomes a space (newlines stay),
//! so offsets in the output line up with the template.

use tracing::debug;

use crate::error::Result;
use crate::lexer::lex;
use crate::options::ExtractRubyOptions;
use crate::token::{Token, TokenType};
use crate::util::HbBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opening {
    Code,
    Comment,
    Escaped,
}

impl Opening {
    fn of(token: &Token, source: &str) -> Self {
        match token.value(source) {
            "<%#" => Opening::Comment,
            "<%%" => Opening::Escaped,
            _ => Opening::Code,
        }
    }
}

/// Extract the Ruby code of a template
pub fn extract_ruby_to_buffer(source: &str, output: &mut HbBuffer, options: &ExtractRubyOptions) -> Result<()> {
    let tokens = lex(source)?;

    if options.preserve_positions {
        extract_ruby_in_place(source, tokens.as_slice(), output, options)?;
    } else {
        extract_ruby_compact(source, tokens.as_slice(), output, options)?;
    }

    debug!(bytes = output.len(), ?options, "extracted ruby");
    Ok(())
}

fn extract_ruby_in_place(
    source: &str,
    tokens: &[Token],
    output: &mut HbBuffer,
    options: &ExtractRubyOptions,
) -> Result<()> {
    let mut opening = Opening::Code;
    let mut has_code = false;

    for token in tokens {
        let text = token.value(source);
        match token.kind {
            TokenType::ErbStart => {
                opening = Opening::of(token, source);
                has_code = false;
                if opening == Opening::Comment && options.comments {
                    output.append_repeated(b' ', text.len() - 1)?;
                    output.append_byte(b'#')?;
                } else {
                    blank(text, output)?;
                }
            }
            TokenType::ErbContent => match opening {
                Opening::Code => {
                    has_code = !text.trim().is_empty();
                    output.append_str(text)?;
                }
                Opening::Comment if options.comments => {
                    let (first_line, rest) = text.split_at(text.find('\n').unwrap_or(text.len()));
                    output.append_str(first_line)?;
                    blank(rest, output)?;
                }
                Opening::Comment | Opening::Escaped => blank(text, output)?,
            },
            TokenType::ErbEnd if options.semicolons && opening == Opening::Code && has_code => {
                output.append_byte(b';')?;
                output.append_repeated(b' ', text.len() - 1)?;
            }
            _ => blank(text, output)?,
        }
    }

    Ok(())
}

fn extract_ruby_compact(
    source: &str,
    tokens: &[Token],
    output: &mut HbBuffer,
    options: &ExtractRubyOptions,
) -> Result<()> {
    let mut opening = Opening::Code;

    for token in tokens {
        match token.kind {
            TokenType::ErbStart => opening = Opening::of(token, source),
            TokenType::ErbContent => {
                let code = token.value(source).trim();
                match opening {
                    Opening::Code if !code.is_empty() => {
                        output.append_str(code)?;
                        if options.semicolons {
                            output.append_byte(b';')?;
                        }
                        output.append_byte(b'\n')?;
                    }
                    Opening::Comment if options.comments => {
                        for line in code.lines() {
                            output.append_str("# ")?;
                            output.append_str(line.trim())?;
                            output.append_byte(b'\n')?;
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Extract the HTML of a template, blanking every ERB tag
pub fn extract_html_to_buffer(source: &str, output: &mut HbBuffer) -> Result<()> {
    let tokens = lex(source)?;

    for token in tokens.iter() {
        let text = token.value(source);
        if token.kind.is_erb() {
            blank(text, output)?;
        } else {
            output.append_str(text)?;
        }
    }

    debug!(bytes = output.len(), "extracted html");
    Ok(())
}

/// Write one space per byte of `text`, keeping newlines
fn blank(text: &str, output: &mut HbBuffer) -> Result<()> {
    let mut run = 0;
    for byte in text.bytes() {
        if byte == b'\n' {
            output.append_repeated(b' ', run)?;
            output.append_byte(b'\n')?;
            run = 0;
        } else {
            run += 1;
        }
    }
    output.append_repeated(b' ', run)
}
