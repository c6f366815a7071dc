//! Domain types.

mod credentials;
mod token;

pub use credentials::{Credentials, SetupResult};
pub use token::Token;
