#![deny(clippy::all)]
#![deny(clippy::pedantic)]
// Allow some overly strict pedantic lints for middleware code
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]

//! Call-Center API Gateway
//!
//! Request authentication and authorization pipeline for a multi-tenant
//! call-center REST API: a stateless JWT service, a closed error taxonomy,
//! a uniform response envelope and the ordered middleware stages that guard
//! every business route.

pub mod domain;
pub mod infrastructure;
pub mod presentation;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use domain::entities::*;
pub use domain::value_objects::{Role, RoleSet, TokenKind};
