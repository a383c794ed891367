//! Domain Layer - the registration record
//!
//! RULES:
//! - No I/O operations (see `adapters/` for persistence)

pub mod output;
pub mod registration;
pub mod token;

pub use output::{RegistrationOutput, RequiredField, PUSH_EPHEMERAL_KEY};
pub use registration::AppServiceRegistration;
pub use token::generate_token;
