//! Raw engine producers
//!
//! These wrap the engine so that every result leaves as a raw pointer with
//! a matching free function, the way a C caller sees it. The `herb_*`
//! entry points and the native handles are both built on them.

use std::ptr;

use herb_core::{DocumentNode, HbBuffer, ParserOptions, Result, TokenList};
use tracing::debug;

/// Lex `source` into a heap token list owned by the caller
pub fn lex(source: &str) -> Result<*mut TokenList> {
    let tokens = herb_core::lex(source)?;
    debug!(tokens = tokens.len(), "lexed source");
    Ok(Box::into_raw(Box::new(tokens)))
}

/// Parse `source` into a heap document owned by the caller
pub fn parse(source: &str, options: &ParserOptions) -> Result<*mut DocumentNode> {
    let document = herb_core::parse(source, options)?;
    Ok(Box::into_raw(Box::new(document)))
}

/// Free a token list from [`lex`]; null is ignored
///
/// # Safety
/// `tokens` must be null or come from [`lex`] and not have been freed.
pub unsafe fn free_tokens(tokens: *mut TokenList) {
    if tokens.is_null() {
        return;
    }
    drop(Box::from_raw(tokens));
}

/// Free a document from [`parse`]; null is ignored
///
/// # Safety
/// `document` must be null or come from [`parse`] and not have been freed.
pub unsafe fn free_document(document: *mut DocumentNode) {
    if document.is_null() {
        return;
    }
    drop(Box::from_raw(document));
}

/// Initialize a caller-owned buffer in place
///
/// On failure the buffer is left in the released state.
///
/// # Safety
/// `buffer` must be valid for writes; its previous contents are not dropped.
pub unsafe fn buffer_init(buffer: *mut HbBuffer, capacity: usize) -> Result<()> {
    match HbBuffer::init(capacity) {
        Ok(initialized) => {
            ptr::write(buffer, initialized);
            Ok(())
        }
        Err(err) => {
            ptr::write(buffer, HbBuffer::released());
            Err(err)
        }
    }
}
