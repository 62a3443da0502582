//! Diagnostics and compile errors.
//!
//! A [`Diagnostic`] is what a compiler's pre-check reports; a
//! [`CompileError`] is the failure of a render request, optionally carrying
//! the diagnostic that caused it.

mod compile_error;
mod diagnostic;
mod severity;

pub use compile_error::CompileError;
pub use diagnostic::Diagnostic;
pub use severity::Severity;
