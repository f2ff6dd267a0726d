//! Request-independent application logic.
//!
//! Routes stay thin: they parse HTTP input and hand off to these functions,
//! which only see the store and the completion seam.

pub mod chat;
pub mod completion;
pub mod document;
pub mod session;
