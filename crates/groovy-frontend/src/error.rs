//! Errors the front-end can report outside of in-band diagnostics.
//!
//! Parse errors themselves never surface as `FrontendError` — they become
//! `Diagnostic`s attached to the `Module` that was still produced. This
//! type covers the cases where no `Module` could be produced at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("source file is not valid UTF-8")]
    InvalidEncoding,

    #[error("source exceeds the front-end's file size limit ({0} bytes)")]
    TooLarge(usize),
}

pub type Result<T> = std::result::Result<T, FrontendError>;
