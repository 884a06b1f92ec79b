//! ERB/HTML lexer

use tracing::debug;

use crate::error::Result;
use crate::location::{Location, Position, Range};
use crate::token::{Token, TokenList, TokenType};

const ERB_OPENINGS: [&str; 6] = ["<%==", "<%%", "<%=", "<%-", "<%#", "<%"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Erb,
}

/// Lex `source` into a token list ending with an `Eof` token
pub fn lex(source: &str) -> Result<TokenList> {
    let mut lexer = Lexer::new(source)?;
    lexer.run()?;

    debug!(tokens = lexer.tokens.len(), bytes = source.len(), "lexed source");
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    position: Position,
    state: State,
    tokens: TokenList,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Result<Self> {
        Ok(Self {
            source,
            offset: 0,
            position: Position::new(1, 0),
            state: State::Data,
            tokens: TokenList::with_capacity(source.len() / 4 + 1)?,
        })
    }

    fn run(&mut self) -> Result<()> {
        while self.offset < self.source.len() {
            match self.state {
                State::Data => self.lex_data()?,
                State::Erb => self.lex_erb()?,
            }
        }

        self.emit(TokenType::Eof, 0)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    fn lex_data(&mut self) -> Result<()> {
        let rest = self.rest();

        if let Some(opening) = ERB_OPENINGS.iter().find(|o| rest.starts_with(**o)) {
            self.state = State::Erb;
            return self.emit(TokenType::ErbStart, opening.len());
        }

        let fixed = [
            ("<!--", TokenType::HtmlCommentStart),
            ("-->", TokenType::HtmlCommentEnd),
            ("</", TokenType::HtmlTagStartClose),
            ("/>", TokenType::HtmlTagSelfClose),
            ("\r\n", TokenType::Newline),
        ];
        if let Some((text, kind)) = fixed.iter().find(|(text, _)| rest.starts_with(*text)) {
            return self.emit(*kind, text.len());
        }

        let first = rest.as_bytes()[0];
        match first {
            b'<' => self.emit(TokenType::HtmlTagStart, 1),
            b'>' => self.emit(TokenType::HtmlTagEnd, 1),
            b'=' => self.emit(TokenType::Equals, 1),
            b'"' | b'\'' => self.emit(TokenType::Quote, 1),
            b'/' => self.emit(TokenType::Slash, 1),
            b'\n' => self.emit(TokenType::Newline, 1),
            b' ' | b'\t' | b'\r' => {
                let len = rest
                    .bytes()
                    .take_while(|b| matches!(b, b' ' | b'\t' | b'\r'))
                    .count();
                // a trailing \r belongs to the following \r\n newline
                let len = if len > 1 && rest[len..].starts_with('\n') && rest.as_bytes()[len - 1] == b'\r' {
                    len - 1
                } else {
                    len
                };
                self.emit(TokenType::Whitespace, len)
            }
            _ if is_identifier_byte(first) => {
                let len = identifier_length(rest);
                self.emit(TokenType::Identifier, len)
            }
            _ => {
                let len = rest.chars().next().map_or(1, char::len_utf8);
                self.emit(TokenType::Character, len)
            }
        }
    }

    fn lex_erb(&mut self) -> Result<()> {
        let rest = self.rest();
        self.state = State::Data;

        let Some(close) = rest.find("%>") else {
            return self.emit(TokenType::ErbContent, rest.len());
        };

        let (content_len, closing_len) = match close.checked_sub(1).map(|i| rest.as_bytes()[i]) {
            Some(b'-') | Some(b'=') => (close - 1, 3),
            _ => (close, 2),
        };

        self.emit(TokenType::ErbContent, content_len)?;
        self.emit(TokenType::ErbEnd, closing_len)
    }

    fn emit(&mut self, kind: TokenType, len: usize) -> Result<()> {
        let from = self.offset;
        let start = self.position;

        for ch in self.source[from..from + len].chars() {
            if ch == '\n' {
                self.position.line += 1;
                self.position.column = 0;
            } else {
                self.position.column += 1;
            }
        }
        self.offset += len;

        self.tokens.push(Token {
            kind,
            range: Range::new(from, self.offset),
            location: Location::new(start, self.position),
        })
    }
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b':')
}

fn identifier_length(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let mut len = 0;
    while len < bytes.len() && is_identifier_byte(bytes[len]) {
        if len > 0 && bytes[len] == b'-' && (rest[len..].starts_with("-->") || rest[len..].starts_with("-%>")) {
            break;
        }
        len += 1;
    }
    len.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        lex(source).unwrap().iter().map(|t| t.kind).collect()
    }

    fn values(source: &str) -> Vec<String> {
        lex(source).unwrap().iter().map(|t| t.value(source).to_string()).collect()
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![TokenType::Eof]);
    }

    #[test]
    fn test_html_tag() {
        use TokenType::*;

        let source = r#"<div class="a">hi</div>"#;
        assert_eq!(
            kinds(source),
            vec![
                HtmlTagStart, Identifier, Whitespace, Identifier, Equals, Quote, Identifier, Quote,
                HtmlTagEnd, Identifier, HtmlTagStartClose, Identifier, HtmlTagEnd, Eof,
            ]
        );
        assert_eq!(values(source)[1], "div");
    }

    #[test]
    fn test_erb_tags() {
        use TokenType::*;

        let source = "<%= user.name %><%- x -%>";
        assert_eq!(
            kinds(source),
            vec![ErbStart, ErbContent, ErbEnd, ErbStart, ErbContent, ErbEnd, Eof]
        );
        assert_eq!(values(source), vec!["<%=", " user.name ", "%>", "<%-", " x ", "-%>", ""]);
    }

    #[test]
    fn test_erb_openings_prefer_longest() {
        assert_eq!(values("<%== raw %>")[0], "<%==");
        assert_eq!(values("<%# note %>")[0], "<%#");
        assert_eq!(values("<%% literal %>")[0], "<%%");
    }

    #[test]
    fn test_unclosed_erb_runs_to_eof() {
        use TokenType::*;

        let source = "<% if true";
        assert_eq!(kinds(source), vec![ErbStart, ErbContent, Eof]);
        assert_eq!(values(source)[1], " if true");
    }

    #[test]
    fn test_comment_tokens() {
        use TokenType::*;

        assert_eq!(
            kinds("<!-- x -->"),
            vec![HtmlCommentStart, Whitespace, Identifier, Whitespace, HtmlCommentEnd, Eof]
        );
        assert_eq!(values("a-->")[0], "a");
    }

    #[test]
    fn test_locations_track_lines() {
        let source = "a\n  <b>";
        let tokens = lex(source).unwrap();
        let tag_start = tokens.iter().find(|t| t.kind == TokenType::HtmlTagStart).unwrap();
        assert_eq!(tag_start.location.start, Position::new(2, 2));
        assert_eq!(tag_start.range, Range::new(4, 5));

        let eof = tokens.iter().last().unwrap();
        assert_eq!(eof.location.start, Position::new(2, 5));
    }

    #[test]
    fn test_crlf_is_one_newline() {
        use TokenType::*;

        assert_eq!(kinds("a \r\nb"), vec![Identifier, Whitespace, Newline, Identifier, Eof]);
    }

    #[test]
    fn test_multibyte_characters() {
        let source = "é<";
        let tokens = lex(source).unwrap();
        assert_eq!(tokens.get(0).unwrap().kind, TokenType::Character);
        assert_eq!(tokens.get(0).unwrap().value(source), "é");
        assert_eq!(tokens.get(1).unwrap().location.start.column, 1);
    }

    #[test]
    fn test_tokens_cover_source() {
        let source = "<p id='x'>\n<%= a -%> é</p><!-- c -->";
        let joined: String = values(source).concat();
        assert_eq!(joined, source);
    }
}
