//! Syntax tree produced by the parser
//!
//! Nodes store byte ranges rather than text; pair them with the parsed
//! source to read names and contents.

use serde::{Deserialize, Serialize};

use crate::location::{Location, Range};
use crate::options::ParserOptions;

/// Root of a parsed template
#[derive(Debug, Clone)]
pub struct DocumentNode {
    pub children: Vec<Node>,
    pub errors: Vec<AstError>,
    pub location: Location,
    /// Options the document was parsed with
    pub options: ParserOptions,
    /// Whether ERB analysis ran
    pub analyzed: bool,
}

#[derive(Debug, Clone)]
pub enum Node {
    Text(TextNode),
    Whitespace(WhitespaceNode),
    Element(HtmlElementNode),
    Attribute(HtmlAttributeNode),
    Comment(HtmlCommentNode),
    Erb(ErbContentNode),
}

#[derive(Debug, Clone)]
pub struct TextNode {
    pub content: Range,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct WhitespaceNode {
    pub content: Range,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct HtmlElementNode {
    pub tag_name: Range,
    pub open_tag: HtmlOpenTagNode,
    pub children: Vec<Node>,
    pub close_tag: Option<HtmlCloseTagNode>,
    pub is_void: bool,
    pub errors: Vec<AstError>,
    pub location: Location,
}

/// `<name attr=value ...>`; children are attributes, ERB tags and
/// (when whitespace is tracked) whitespace
#[derive(Debug, Clone)]
pub struct HtmlOpenTagNode {
    pub tag_name: Range,
    pub children: Vec<Node>,
    pub is_self_closing: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct HtmlCloseTagNode {
    pub tag_name: Range,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct HtmlAttributeNode {
    pub name: Range,
    pub value: Option<HtmlAttributeValue>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct HtmlAttributeValue {
    /// Value without its quotes
    pub content: Range,
    pub quoted: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct HtmlCommentNode {
    pub content: Range,
    pub errors: Vec<AstError>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ErbContentNode {
    pub tag_opening: Range,
    pub content: Range,
    pub tag_closing: Option<Range>,
    /// Set by analysis
    pub kind: Option<ErbKind>,
    pub errors: Vec<AstError>,
    pub location: Location,
}

/// What an ERB tag does, as classified by analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErbKind {
    /// `<%= expr %>`
    Output,
    /// `<%# ... %>`
    Comment,
    /// `<%% ... %>`, literal text
    Escaped,
    /// `if`, `unless`, `case`, ... and their `else`-like branches
    Control,
    /// Opens a `do` block
    Block,
    /// `end`
    BlockEnd,
    Statement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstError {
    pub kind: AstErrorKind,
    pub message: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AstErrorKind {
    UnclosedElement,
    MissingClosingTag,
    UnexpectedClosingTag,
    UnclosedComment,
    UnclosedErbTag,
    UnmatchedErbEnd,
    MissingErbEnd,
}

impl AstErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            AstErrorKind::UnclosedElement => "UnclosedElementError",
            AstErrorKind::MissingClosingTag => "MissingClosingTagError",
            AstErrorKind::UnexpectedClosingTag => "UnexpectedClosingTagError",
            AstErrorKind::UnclosedComment => "UnclosedCommentError",
            AstErrorKind::UnclosedErbTag => "UnclosedERBTagError",
            AstErrorKind::UnmatchedErbEnd => "UnmatchedERBEndError",
            AstErrorKind::MissingErbEnd => "MissingERBEndError",
        }
    }
}

impl AstError {
    pub fn new(kind: AstErrorKind, message: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }
}

impl Node {
    /// External node type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Text(_) => "AST_HTML_TEXT_NODE",
            Node::Whitespace(_) => "AST_WHITESPACE_NODE",
            Node::Element(_) => "AST_HTML_ELEMENT_NODE",
            Node::Attribute(_) => "AST_HTML_ATTRIBUTE_NODE",
            Node::Comment(_) => "AST_HTML_COMMENT_NODE",
            Node::Erb(_) => "AST_ERB_CONTENT_NODE",
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Node::Text(node) => node.location,
            Node::Whitespace(node) => node.location,
            Node::Element(node) => node.location,
            Node::Attribute(node) => node.location,
            Node::Comment(node) => node.location,
            Node::Erb(node) => node.location,
        }
    }

    pub fn errors(&self) -> &[AstError] {
        match self {
            Node::Element(node) => &node.errors,
            Node::Comment(node) => &node.errors,
            Node::Erb(node) => &node.errors,
            Node::Text(_) | Node::Whitespace(_) | Node::Attribute(_) => &[],
        }
    }
}

impl DocumentNode {
    /// Every error in the tree, document-level first, then in source order
    pub fn all_errors(&self) -> Vec<&AstError> {
        let mut errors: Vec<&AstError> = self.errors.iter().collect();
        walk(&self.children, &mut |node| errors.extend(node.errors()));
        errors
    }

    /// Visit every node in source order, open-tag children included
    pub fn visit(&self, visitor: &mut impl FnMut(&Node)) {
        walk(&self.children, visitor);
    }

    /// Visit every ERB node mutably, in source order
    pub fn visit_erb_mut(&mut self, visitor: &mut impl FnMut(&mut ErbContentNode)) {
        walk_erb_mut(&mut self.children, visitor);
    }
}

fn walk<'a>(nodes: &'a [Node], visitor: &mut impl FnMut(&'a Node)) {
    for node in nodes {
        visitor(node);
        if let Node::Element(element) = node {
            walk(&element.open_tag.children, visitor);
            walk(&element.children, visitor);
        }
    }
}

fn walk_erb_mut(nodes: &mut [Node], visitor: &mut impl FnMut(&mut ErbContentNode)) {
    for node in nodes {
        match node {
            Node::Erb(erb) => visitor(erb),
            Node::Element(element) => {
                walk_erb_mut(&mut element.open_tag.children, visitor);
                walk_erb_mut(&mut element.children, visitor);
            }
            _ => {}
        }
    }
}
