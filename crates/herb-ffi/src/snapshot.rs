//! Owned snapshots of engine results
//!
//! Converters capture tokens and trees into these structs, which own every
//! string they carry. Hosts build their values from a snapshot, never from
//! native storage.

use herb_core::ast::{HtmlElementNode, Node};
use herb_core::{AstError, DocumentNode, ErbKind, Location, Range, TokenList};
use serde::Serialize;

/// One token with its text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSnapshot {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
    pub range: Range,
    pub location: Location,
}

/// Result of lexing one source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexSnapshot {
    pub value: Vec<TokenSnapshot>,
    pub source: String,
}

/// Error attached to a node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSnapshot {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub location: Location,
}

/// A syntax tree node with its text resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum NodeSnapshot {
    #[serde(rename = "AST_DOCUMENT_NODE")]
    Document {
        location: Location,
        children: Vec<NodeSnapshot>,
        errors: Vec<ErrorSnapshot>,
    },
    #[serde(rename = "AST_HTML_TEXT_NODE")]
    Text { location: Location, content: String },
    #[serde(rename = "AST_WHITESPACE_NODE")]
    Whitespace { location: Location, value: String },
    #[serde(rename = "AST_HTML_ELEMENT_NODE")]
    Element {
        location: Location,
        tag_name: String,
        /// Attributes, ERB tags and tracked whitespace inside the open tag
        open_tag: Vec<NodeSnapshot>,
        children: Vec<NodeSnapshot>,
        is_void: bool,
        is_self_closing: bool,
        closed: bool,
        errors: Vec<ErrorSnapshot>,
    },
    #[serde(rename = "AST_HTML_ATTRIBUTE_NODE")]
    Attribute {
        location: Location,
        name: String,
        value: Option<String>,
        quoted: bool,
    },
    #[serde(rename = "AST_HTML_COMMENT_NODE")]
    Comment {
        location: Location,
        content: String,
        errors: Vec<ErrorSnapshot>,
    },
    #[serde(rename = "AST_ERB_CONTENT_NODE")]
    Erb {
        location: Location,
        tag_opening: String,
        content: String,
        tag_closing: Option<String>,
        kind: Option<ErbKind>,
        errors: Vec<ErrorSnapshot>,
    },
}

/// Result of parsing one source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseSnapshot {
    pub value: NodeSnapshot,
    pub source: String,
    /// Every error in the tree, in document order
    pub errors: Vec<ErrorSnapshot>,
}

impl LexSnapshot {
    pub fn capture(tokens: &TokenList, source: &str) -> Self {
        let value = tokens
            .iter()
            .map(|token| TokenSnapshot {
                kind: token.kind.name(),
                value: token.value(source).to_owned(),
                range: token.range,
                location: token.location,
            })
            .collect();

        Self {
            value,
            source: source.to_owned(),
        }
    }
}

impl ParseSnapshot {
    pub fn capture(document: &DocumentNode, source: &str) -> Self {
        Self {
            value: NodeSnapshot::Document {
                location: document.location,
                children: capture_nodes(&document.children, source),
                errors: capture_errors(&document.errors),
            },
            source: source.to_owned(),
            errors: document.all_errors().into_iter().map(ErrorSnapshot::from).collect(),
        }
    }
}

impl NodeSnapshot {
    /// External node type name
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeSnapshot::Document { .. } => "AST_DOCUMENT_NODE",
            NodeSnapshot::Text { .. } => "AST_HTML_TEXT_NODE",
            NodeSnapshot::Whitespace { .. } => "AST_WHITESPACE_NODE",
            NodeSnapshot::Element { .. } => "AST_HTML_ELEMENT_NODE",
            NodeSnapshot::Attribute { .. } => "AST_HTML_ATTRIBUTE_NODE",
            NodeSnapshot::Comment { .. } => "AST_HTML_COMMENT_NODE",
            NodeSnapshot::Erb { .. } => "AST_ERB_CONTENT_NODE",
        }
    }

    pub fn children(&self) -> &[NodeSnapshot] {
        match self {
            NodeSnapshot::Document { children, .. } | NodeSnapshot::Element { children, .. } => children,
            _ => &[],
        }
    }

    fn capture(node: &Node, source: &str) -> Self {
        match node {
            Node::Text(text) => NodeSnapshot::Text {
                location: text.location,
                content: text.content.slice(source).to_owned(),
            },
            Node::Whitespace(whitespace) => NodeSnapshot::Whitespace {
                location: whitespace.location,
                value: whitespace.content.slice(source).to_owned(),
            },
            Node::Element(element) => capture_element(element, source),
            Node::Attribute(attribute) => NodeSnapshot::Attribute {
                location: attribute.location,
                name: attribute.name.slice(source).to_owned(),
                value: attribute.value.as_ref().map(|v| v.content.slice(source).to_owned()),
                quoted: attribute.value.as_ref().is_some_and(|v| v.quoted),
            },
            Node::Comment(comment) => NodeSnapshot::Comment {
                location: comment.location,
                content: comment.content.slice(source).to_owned(),
                errors: capture_errors(&comment.errors),
            },
            Node::Erb(erb) => NodeSnapshot::Erb {
                location: erb.location,
                tag_opening: erb.tag_opening.slice(source).to_owned(),
                content: erb.content.slice(source).to_owned(),
                tag_closing: erb.tag_closing.map(|closing| closing.slice(source).to_owned()),
                kind: erb.kind,
                errors: capture_errors(&erb.errors),
            },
        }
    }
}

fn capture_element(element: &HtmlElementNode, source: &str) -> NodeSnapshot {
    NodeSnapshot::Element {
        location: element.location,
        tag_name: element.tag_name.slice(source).to_owned(),
        open_tag: capture_nodes(&element.open_tag.children, source),
        children: capture_nodes(&element.children, source),
        is_void: element.is_void,
        is_self_closing: element.open_tag.is_self_closing,
        closed: element.close_tag.is_some(),
        errors: capture_errors(&element.errors),
    }
}

fn capture_nodes(nodes: &[Node], source: &str) -> Vec<NodeSnapshot> {
    nodes.iter().map(|node| NodeSnapshot::capture(node, source)).collect()
}

fn capture_errors(errors: &[AstError]) -> Vec<ErrorSnapshot> {
    errors.iter().map(ErrorSnapshot::from).collect()
}

impl From<&AstError> for ErrorSnapshot {
    fn from(error: &AstError) -> Self {
        Self {
            kind: error.kind.name(),
            message: error.message.clone(),
            location: error.location,
        }
    }
}
