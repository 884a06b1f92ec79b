//! Post-parse analysis of ERB tags
//!
//! Classifies every ERB node and pairs control-flow and block openers with
//! their `end`, recording errors on the nodes that do not pair up.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::ast::{AstError, AstErrorKind, DocumentNode, ErbContentNode, ErbKind};

const OPENERS: [&str; 7] = ["if", "unless", "case", "while", "until", "for", "begin"];
const BRANCHES: [&str; 6] = ["elsif", "else", "when", "in", "rescue", "ensure"];

fn block_opener() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bdo\s*(\|[^|]*\|)?\s*$").expect("block pattern is valid"))
}

fn trailing_end() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(^|[\s;])end\s*$").expect("end pattern is valid"))
}

/// Classify ERB tags and check `end` pairing
pub fn analyze(document: &mut DocumentNode, source: &str) {
    let mut open: Vec<usize> = Vec::new();
    let mut unmatched_ends: Vec<usize> = Vec::new();
    let mut index = 0;

    document.visit_erb_mut(&mut |erb| {
        let kind = classify(erb, source);
        erb.kind = Some(kind);

        match kind {
            ErbKind::Control if opens_scope(erb, source) => open.push(index),
            ErbKind::Block => open.push(index),
            ErbKind::BlockEnd => {
                if open.pop().is_none() {
                    unmatched_ends.push(index);
                }
            }
            _ => {}
        }
        index += 1;
    });

    let mut index = 0;
    document.visit_erb_mut(&mut |erb| {
        if unmatched_ends.contains(&index) {
            erb.errors.push(AstError::new(
                AstErrorKind::UnmatchedErbEnd,
                "`end` does not close any open ERB block",
                erb.location,
            ));
        }
        if open.contains(&index) {
            erb.errors.push(AstError::new(
                AstErrorKind::MissingErbEnd,
                format!("`{}` is never closed with `end`", erb.content.slice(source).trim()),
                erb.location,
            ));
        }
        index += 1;
    });

    trace!(unclosed = open.len(), unmatched = unmatched_ends.len(), "analyzed erb tags");
    document.analyzed = true;
}

fn classify(erb: &ErbContentNode, source: &str) -> ErbKind {
    let opening = erb.tag_opening.slice(source);
    let code = erb.content.slice(source).trim();

    match opening {
        "<%#" => return ErbKind::Comment,
        "<%%" => return ErbKind::Escaped,
        _ => {}
    }

    if block_opener().is_match(code) {
        return ErbKind::Block;
    }
    if opening.starts_with("<%=") {
        return ErbKind::Output;
    }

    match first_word(code) {
        "end" => ErbKind::BlockEnd,
        word if OPENERS.contains(&word) || BRANCHES.contains(&word) => ErbKind::Control,
        _ => ErbKind::Statement,
    }
}

fn opens_scope(erb: &ErbContentNode, source: &str) -> bool {
    let code = erb.content.slice(source).trim();
    OPENERS.contains(&first_word(code)) && !trailing_end().is_match(code)
}

fn first_word(code: &str) -> &str {
    let end = code
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(code.len());
    &code[..end]
}

#[cfg(test)]
mod tests {
    use crate::ast::{AstErrorKind, ErbKind, Node};
    use crate::options::ParserOptions;
    use crate::parser::parse;

    fn erb_kinds(source: &str) -> Vec<ErbKind> {
        let document = parse(source, &ParserOptions::DEFAULT).unwrap();
        let mut kinds = Vec::new();
        document.visit(&mut |node| {
            if let Node::Erb(erb) = node {
                kinds.push(erb.kind.unwrap());
            }
        });
        kinds
    }

    #[test]
    fn test_classification() {
        use ErbKind::*;

        assert_eq!(
            erb_kinds("<%= a %><%# c %><%% e %><% if x %><% else %><% end %><% y = 1 %>"),
            vec![Output, Comment, Escaped, Control, Control, BlockEnd, Statement]
        );
        assert_eq!(
            erb_kinds("<% items.each do |item| %><%= form_with do |f| %><% end %><% end %>"),
            vec![Block, Block, BlockEnd, BlockEnd]
        );
    }

    #[test]
    fn test_balanced_blocks_have_no_errors() {
        let source = "<% if a %><div><% items.each do |i| %><%= i %><% end %></div><% end %>";
        let document = parse(source, &ParserOptions::DEFAULT).unwrap();
        assert!(document.analyzed);
        assert!(document.all_errors().is_empty());
    }

    #[test]
    fn test_one_line_conditional_opens_nothing() {
        let document = parse("<% if a then b end %>", &ParserOptions::DEFAULT).unwrap();
        assert!(document.all_errors().is_empty());
    }

    #[test]
    fn test_unbalanced_blocks() {
        let document = parse("<% end %><% unless a %>", &ParserOptions::DEFAULT).unwrap();
        let kinds: Vec<AstErrorKind> = document.all_errors().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![AstErrorKind::UnmatchedErbEnd, AstErrorKind::MissingErbEnd]);
    }

    #[test]
    fn test_analysis_can_be_disabled() {
        let options = ParserOptions { analyze: false, ..ParserOptions::DEFAULT };
        let document = parse("<% end %>", &options).unwrap();
        assert!(!document.analyzed);
        assert!(document.all_errors().is_empty());
        match &document.children[0] {
            Node::Erb(erb) => assert!(erb.kind.is_none()),
            other => panic!("unexpected {}", other.type_name()),
        }
    }
}
