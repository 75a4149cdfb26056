pub mod role;
pub mod token_kind;

pub use role::*;
pub use token_kind::*;
