//! Actix middleware shared by every route.
//!
//! [`Trace`] wraps the whole application so both the machine API and the
//! page endpoints log and answer with a `trace-id`.

pub mod trace;

pub use trace::Trace;
