//! ERB/HTML parser
//!
//! Builds a [`DocumentNode`] from the token stream. Elements are kept on an
//! explicit stack; a closing tag pops everything above its match, and
//! elements closed that way are reported unless HTML allows omitting their
//! end tag (reported anyway in strict mode).

use tracing::debug;

use crate::analyze::analyze;
use crate::ast::*;
use crate::error::Result;
use crate::lexer::lex;
use crate::location::{Location, Position, Range};
use crate::options::ParserOptions;
use crate::token::{Token, TokenType};

const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

const OPTIONAL_END_ELEMENTS: [&str; 8] = ["li", "p", "td", "th", "tr", "option", "dt", "dd"];

/// Parse `source` into a document tree
pub fn parse(source: &str, options: &ParserOptions) -> Result<DocumentNode> {
    let tokens = lex(source)?;
    let mut parser = Parser {
        source,
        tokens: tokens.as_slice(),
        pos: 0,
        options: *options,
        stack: Vec::new(),
        root: Vec::new(),
        errors: Vec::new(),
    };
    parser.run();

    let end = tokens.as_slice().last().map(|t| t.location.end).unwrap_or_default();
    let mut document = DocumentNode {
        children: parser.root,
        errors: parser.errors,
        location: Location::new(Position::new(1, 0), end),
        options: *options,
        analyzed: false,
    };

    if options.analyze {
        analyze(&mut document, source);
    }

    debug!(
        children = document.children.len(),
        errors = document.all_errors().len(),
        analyzed = document.analyzed,
        "parsed document"
    );
    Ok(document)
}

struct Frame {
    name: String,
    element: HtmlElementNode,
}

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
    options: ParserOptions,
    stack: Vec<Frame>,
    root: Vec<Node>,
    errors: Vec<AstError>,
}

impl<'a> Parser<'a> {
    fn run(&mut self) {
        loop {
            let token = self.current();
            match token.kind {
                TokenType::Eof => break,
                TokenType::ErbStart => {
                    let node = self.parse_erb();
                    self.push_child(Node::Erb(node));
                }
                TokenType::HtmlCommentStart => {
                    let node = self.parse_comment();
                    self.push_child(Node::Comment(node));
                }
                TokenType::HtmlTagStart if self.peek_kind(1) == TokenType::Identifier => self.parse_open_tag(),
                TokenType::HtmlTagStartClose
                    if self.peek_kind(1) == TokenType::Identifier && self.peek_kind(2) == TokenType::HtmlTagEnd =>
                {
                    self.parse_close_tag()
                }
                _ => {
                    self.push_text(token);
                    self.pos += 1;
                }
            }
        }

        while let Some(frame) = self.stack.pop() {
            let mut element = frame.element;
            let kind = if self.may_omit_end(&frame.name) {
                None
            } else if OPTIONAL_END_ELEMENTS.contains(&frame.name.as_str()) {
                Some(AstErrorKind::MissingClosingTag)
            } else {
                Some(AstErrorKind::UnclosedElement)
            };
            if let Some(kind) = kind {
                element.errors.push(AstError::new(
                    kind,
                    format!("Opening tag `<{}>` is never closed", frame.name),
                    element.open_tag.location,
                ));
            }
            self.finish_element(element);
        }
    }

    fn current(&self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self, ahead: usize) -> TokenType {
        self.tokens
            .get(self.pos + ahead)
            .map_or(TokenType::Eof, |t| t.kind)
    }

    fn children(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.element.children,
            None => &mut self.root,
        }
    }

    fn push_child(&mut self, node: Node) {
        self.children().push(node);
    }

    fn push_text(&mut self, token: Token) {
        let children = self.children();
        if let Some(Node::Text(text)) = children.last_mut() {
            if text.content.to == token.range.from {
                text.content.to = token.range.to;
                text.location.end = token.location.end;
                return;
            }
        }
        children.push(Node::Text(TextNode {
            content: token.range,
            location: token.location,
        }));
    }

    fn parse_erb(&mut self) -> ErbContentNode {
        let opening = self.current();
        self.pos += 1;

        let content = if self.current().kind == TokenType::ErbContent {
            let token = self.current();
            self.pos += 1;
            token
        } else {
            Token {
                kind: TokenType::ErbContent,
                range: Range::new(opening.range.to, opening.range.to),
                location: Location::new(opening.location.end, opening.location.end),
            }
        };

        let mut node = ErbContentNode {
            tag_opening: opening.range,
            content: content.range,
            tag_closing: None,
            kind: None,
            errors: Vec::new(),
            location: Location::new(opening.location.start, content.location.end),
        };

        if self.current().kind == TokenType::ErbEnd {
            let closing = self.current();
            self.pos += 1;
            node.tag_closing = Some(closing.range);
            node.location.end = closing.location.end;
        } else {
            node.errors.push(AstError::new(
                AstErrorKind::UnclosedErbTag,
                format!("ERB tag `{}` is never closed", opening.value(self.source)),
                node.location,
            ));
        }

        node
    }

    fn parse_comment(&mut self) -> HtmlCommentNode {
        let opening = self.current();
        self.pos += 1;

        let from = opening.range.to;
        let mut end = opening.location.end;
        let mut to = from;
        while !matches!(self.current().kind, TokenType::HtmlCommentEnd | TokenType::Eof) {
            let token = self.current();
            to = token.range.to;
            end = token.location.end;
            self.pos += 1;
        }

        let mut node = HtmlCommentNode {
            content: Range::new(from, to),
            errors: Vec::new(),
            location: Location::new(opening.location.start, end),
        };

        if self.current().kind == TokenType::HtmlCommentEnd {
            node.location.end = self.current().location.end;
            self.pos += 1;
        } else {
            node.errors.push(AstError::new(
                AstErrorKind::UnclosedComment,
                "HTML comment is never closed",
                node.location,
            ));
        }

        node
    }

    fn parse_open_tag(&mut self) {
        let start = self.current();
        let name_token = self.tokens[self.pos + 1];
        self.pos += 2;

        let name = name_token.value(self.source).to_ascii_lowercase();
        let mut open_tag = HtmlOpenTagNode {
            tag_name: name_token.range,
            children: Vec::new(),
            is_self_closing: false,
            location: Location::new(start.location.start, name_token.location.end),
        };
        let mut errors = Vec::new();

        loop {
            let token = self.current();
            match token.kind {
                TokenType::HtmlTagEnd => {
                    open_tag.location.end = token.location.end;
                    self.pos += 1;
                    break;
                }
                TokenType::HtmlTagSelfClose => {
                    open_tag.location.end = token.location.end;
                    open_tag.is_self_closing = true;
                    self.pos += 1;
                    break;
                }
                TokenType::Eof => {
                    errors.push(AstError::new(
                        AstErrorKind::UnclosedElement,
                        format!("Opening tag `<{}` is never terminated with `>`", name),
                        open_tag.location,
                    ));
                    break;
                }
                TokenType::Whitespace | TokenType::Newline => {
                    if self.options.track_whitespace {
                        open_tag.children.push(Node::Whitespace(WhitespaceNode {
                            content: token.range,
                            location: token.location,
                        }));
                    }
                    open_tag.location.end = token.location.end;
                    self.pos += 1;
                }
                TokenType::ErbStart => {
                    let erb = self.parse_erb();
                    open_tag.location.end = erb.location.end;
                    open_tag.children.push(Node::Erb(erb));
                }
                TokenType::Identifier => {
                    let attribute = self.parse_attribute();
                    open_tag.location.end = attribute.location.end;
                    open_tag.children.push(Node::Attribute(attribute));
                }
                _ => {
                    open_tag.location.end = token.location.end;
                    self.pos += 1;
                }
            }
        }

        let is_void = VOID_ELEMENTS.contains(&name.as_str());
        let element = HtmlElementNode {
            tag_name: name_token.range,
            location: open_tag.location,
            children: Vec::new(),
            close_tag: None,
            is_void,
            errors,
            open_tag,
        };

        if is_void || element.open_tag.is_self_closing || !element.errors.is_empty() {
            self.push_child(Node::Element(element));
        } else {
            self.stack.push(Frame { name, element });
        }
    }

    fn parse_attribute(&mut self) -> HtmlAttributeNode {
        let name = self.current();
        self.pos += 1;

        let mut attribute = HtmlAttributeNode {
            name: name.range,
            value: None,
            location: name.location,
        };

        if self.current().kind != TokenType::Equals {
            return attribute;
        }
        let equals = self.current();
        self.pos += 1;
        attribute.location.end = equals.location.end;

        let first = self.current();
        if first.kind == TokenType::Quote {
            let quote = first.value(self.source);
            self.pos += 1;
            let from = first.range.to;
            let mut to = from;
            let mut end = first.location.end;
            loop {
                let token = self.current();
                if token.kind == TokenType::Eof {
                    break;
                }
                self.pos += 1;
                if token.kind == TokenType::Quote && token.value(self.source) == quote {
                    end = token.location.end;
                    break;
                }
                to = token.range.to;
                end = token.location.end;
            }
            attribute.value = Some(HtmlAttributeValue {
                content: Range::new(from, to),
                quoted: true,
                location: Location::new(first.location.start, end),
            });
            attribute.location.end = end;
        } else {
            let from = first.range.from;
            let mut to = from;
            let mut end = first.location.start;
            while matches!(
                self.current().kind,
                TokenType::Identifier | TokenType::Character | TokenType::Slash
            ) {
                let token = self.current();
                to = token.range.to;
                end = token.location.end;
                self.pos += 1;
            }
            if to > from {
                attribute.value = Some(HtmlAttributeValue {
                    content: Range::new(from, to),
                    quoted: false,
                    location: Location::new(first.location.start, end),
                });
                attribute.location.end = end;
            }
        }

        attribute
    }

    fn parse_close_tag(&mut self) {
        let start = self.current();
        let name_token = self.tokens[self.pos + 1];
        let end = self.tokens[self.pos + 2];
        self.pos += 3;

        let name = name_token.value(self.source).to_ascii_lowercase();
        let close_tag = HtmlCloseTagNode {
            tag_name: name_token.range,
            location: Location::new(start.location.start, end.location.end),
        };

        let Some(depth) = self.stack.iter().rposition(|frame| frame.name == name) else {
            self.errors.push(AstError::new(
                AstErrorKind::UnexpectedClosingTag,
                format!("Found closing tag `</{}>` without a matching opening tag", name),
                close_tag.location,
            ));
            return;
        };

        while self.stack.len() > depth + 1 {
            let Some(frame) = self.stack.pop() else { break };
            let mut element = frame.element;
            if !self.may_omit_end(&frame.name) {
                element.errors.push(AstError::new(
                    AstErrorKind::MissingClosingTag,
                    format!("Opening tag `<{}>` is closed implicitly by `</{}>`", frame.name, name),
                    element.open_tag.location,
                ));
            }
            self.finish_element(element);
        }

        if let Some(frame) = self.stack.pop() {
            let mut element = frame.element;
            element.location.end = close_tag.location.end;
            element.close_tag = Some(close_tag);
            self.push_child(Node::Element(element));
        }
    }

    fn finish_element(&mut self, mut element: HtmlElementNode) {
        if let Some(last) = element.children.last() {
            element.location.end = last.location().end;
        }
        self.push_child(Node::Element(element));
    }

    fn may_omit_end(&self, name: &str) -> bool {
        !self.options.strict && OPTIONAL_END_ELEMENTS.contains(&name)
    }
}
