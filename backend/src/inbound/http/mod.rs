//! HTTP inbound adapter: the machine API under `/api/*.php` and the page
//! view-model endpoints.

pub mod account;
pub mod admin;
pub mod bearer;
pub mod current_user;
pub mod error;
pub mod health;
pub mod job_api;
pub mod login;
pub mod pages;
pub mod payload;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod vtcs;

pub use error::ApiResult;
