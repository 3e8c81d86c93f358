//! MyTruckTracker backend library.
//!
//! The crate follows a hexagonal layout: [`domain`] holds types, ports and
//! services, [`inbound`] adapts HTTP requests onto the driving ports and
//! [`outbound`] implements the driven ports against PostgreSQL, Discord,
//! WebSocket endpoints and Steam.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
pub use domain::TraceId;
