//! Bearer credential issuance and validation

pub mod claims;
pub mod service;

pub use claims::{unix_now, Claims, Subject};
pub use service::{parse_bearer, JwtService, TokenError, TokenPair};
