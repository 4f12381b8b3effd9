//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route. Identity
//! checks live with the HTTP adapter in `inbound::http::identity`.

pub mod trace;

pub use trace::Trace;
