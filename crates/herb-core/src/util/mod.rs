//! Low-level containers shared by the engine and the bindings

pub mod buffer;
pub mod narray;

pub use buffer::HbBuffer;
pub use narray::{HbNarray, Plain};
