//! HTTP middleware stack: CORS policy and per-request trace spans.

pub mod cors;
pub mod trace;
