//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **notifier**: Discord webhook and WebSocket job notifications
//! - **steam**: Steam OpenID verification and Web API profile lookup
//! - **password**: Argon2 hashing for local accounts
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod notifier;
pub mod password;
pub mod persistence;
pub mod steam;
