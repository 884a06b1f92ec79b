//! Scoped conversion of native results into host values
//!
//! The producer runs first and its result is put under a [`NativeHandle`]
//! before the converter sees it. The handle is released after the
//! converter, whether it returned a value, returned early with an error or
//! panicked, so every native result is freed exactly once before control
//! goes back to the host.
//!
//! The converter borrows the output through a higher-ranked lifetime, so
//! the value it returns cannot keep a reference into native storage.

use std::cell::Cell;

use herb_core::HerbError;
use tracing::{debug, warn};

use crate::handle::{NativeHandle, NativeResource};

/// Produce a native result, convert it, then release it
///
/// A producer that allocated nothing returns a null resource; the converter
/// then sees `None` and decides what an absent result means.
pub fn convert_scoped<R, T, E>(
    produce: impl FnOnce() -> R,
    convert: impl FnOnce(Option<&R::Output>) -> Result<T, E>,
) -> Result<T, E>
where
    R: NativeResource,
{
    let mut handle = NativeHandle::new(produce());
    let converted = convert(handle.output());
    handle.release();

    match &converted {
        Ok(_) => debug!(kind = R::KIND.name(), "converted native result"),
        Err(_) => warn!(kind = R::KIND.name(), "conversion failed, native result released"),
    }

    converted
}

/// [`convert_scoped`] for producers that report why they produced nothing
///
/// A failed producer becomes a null handle and the converter is skipped;
/// the producer's error is returned instead.
pub fn convert_produced<R, T, E>(
    produce: impl FnOnce() -> Result<R, HerbError>,
    convert: impl FnOnce(&R::Output) -> Result<T, E>,
) -> Result<T, E>
where
    R: NativeResource,
    E: From<HerbError>,
{
    let failure = Cell::new(None);

    convert_scoped(
        || {
            produce().unwrap_or_else(|err| {
                failure.set(Some(err));
                R::null()
            })
        },
        |output| match output {
            Some(output) => convert(output),
            None => Err(failure
                .take()
                .unwrap_or_else(|| HerbError::conversion("engine produced no result"))
                .into()),
        },
    )
}
