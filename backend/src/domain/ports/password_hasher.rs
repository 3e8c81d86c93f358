//! Port for hashing and checking local account passwords.

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed or the stored hash could not be parsed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Encode a new password hash.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Whether `password` matches `encoded`.
    fn verify(&self, password: &str, encoded: &str) -> Result<bool, PasswordHashError>;
}
