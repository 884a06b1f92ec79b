//! Ownership of native engine results
//!
//! A [`NativeHandle`] owns exactly one engine output for the duration of a
//! call. It is released once: explicitly through [`NativeHandle::release`],
//! or on drop when the call unwinds before getting there.

use herb_core::{DocumentNode, HbBuffer, Result, TokenList};
use tracing::{trace, warn};

use crate::native;
use crate::types::ResultKind;

/// Manually managed engine output
pub trait NativeResource {
    /// What converters get to read
    type Output: ?Sized;

    const KIND: ResultKind;

    /// A resource holding nothing, standing in for a failed producer
    fn null() -> Self;

    /// Borrow the engine output; `None` when there is nothing to read
    fn output(&self) -> Option<&Self::Output>;

    /// Free the native storage. Must be a no-op for a null resource.
    fn release(&mut self);
}

/// Single-owner guard around a [`NativeResource`]
pub struct NativeHandle<R: NativeResource> {
    resource: Option<R>,
}

impl<R: NativeResource> NativeHandle<R> {
    pub fn new(resource: R) -> Self {
        Self {
            resource: Some(resource),
        }
    }

    pub fn output(&self) -> Option<&R::Output> {
        self.resource.as_ref().and_then(R::output)
    }

    pub fn is_released(&self) -> bool {
        self.resource.is_none()
    }

    /// Release the resource; later calls do nothing
    pub fn release(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            resource.release();
            trace!(kind = R::KIND.name(), "released native handle");
        }
    }
}

impl<R: NativeResource> Drop for NativeHandle<R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Token list from the lexer, freed with `herb_free_tokens` semantics
#[derive(Debug)]
pub struct RawTokens {
    tokens: *mut TokenList,
}

impl RawTokens {
    /// Take ownership of a token list pointer
    ///
    /// # Safety
    /// `tokens` must be null or come from [`native::lex`], and nothing else
    /// may free it.
    pub unsafe fn from_raw(tokens: *mut TokenList) -> Self {
        Self { tokens }
    }

    /// Run the lexer, returning an owning resource
    pub fn lex(source: &str) -> Result<Self> {
        let tokens = native::lex(source)?;
        Ok(unsafe { Self::from_raw(tokens) })
    }
}

impl NativeResource for RawTokens {
    type Output = TokenList;

    const KIND: ResultKind = ResultKind::Tokens;

    fn null() -> Self {
        Self {
            tokens: std::ptr::null_mut(),
        }
    }

    fn output(&self) -> Option<&TokenList> {
        unsafe { self.tokens.as_ref() }
    }

    fn release(&mut self) {
        unsafe { native::free_tokens(self.tokens) };
        self.tokens = std::ptr::null_mut();
    }
}

/// Document tree from the parser
#[derive(Debug)]
pub struct RawDocument {
    document: *mut DocumentNode,
}

impl RawDocument {
    /// Take ownership of a document pointer
    ///
    /// # Safety
    /// `document` must be null or come from [`native::parse`], and nothing
    /// else may free it.
    pub unsafe fn from_raw(document: *mut DocumentNode) -> Self {
        Self { document }
    }

    /// Run the parser, returning an owning resource
    pub fn parse(source: &str, options: &herb_core::ParserOptions) -> Result<Self> {
        let document = native::parse(source, options)?;
        Ok(unsafe { Self::from_raw(document) })
    }
}

impl NativeResource for RawDocument {
    type Output = DocumentNode;

    const KIND: ResultKind = ResultKind::Document;

    fn null() -> Self {
        Self {
            document: std::ptr::null_mut(),
        }
    }

    fn output(&self) -> Option<&DocumentNode> {
        unsafe { self.document.as_ref() }
    }

    fn release(&mut self) {
        unsafe { native::free_document(self.document) };
        self.document = std::ptr::null_mut();
    }
}

/// Text buffer filled by an extractor
///
/// The output is only readable once the extractor finished; a partially
/// written buffer reads as nothing.
#[derive(Debug)]
pub struct RawText {
    buffer: HbBuffer,
    complete: bool,
}

impl RawText {
    /// Wrap an initialized buffer and let `extract` fill it
    pub fn extract(buffer: HbBuffer, extract: impl FnOnce(&mut HbBuffer) -> Result<()>) -> Self {
        let mut text = Self {
            buffer,
            complete: false,
        };

        match extract(&mut text.buffer) {
            Ok(()) => text.complete = true,
            Err(err) => warn!(%err, written = text.buffer.len(), "extraction stopped early"),
        }

        text
    }
}

impl NativeResource for RawText {
    type Output = str;

    const KIND: ResultKind = ResultKind::Text;

    fn null() -> Self {
        Self {
            buffer: HbBuffer::released(),
            complete: false,
        }
    }

    fn output(&self) -> Option<&str> {
        if self.complete {
            Some(self.buffer.as_str())
        } else {
            None
        }
    }

    fn release(&mut self) {
        self.buffer.deinit();
        self.complete = false;
    }
}
