pub mod claims;
pub mod error;
pub mod extractors;
pub mod resolver;
pub mod roles;

pub use claims::Claims;
pub use error::{AuthError, AuthResult};
pub use extractors::bearer_header_value;
pub use resolver::TokenResolver;
pub use roles::{Role, ALL_ROLES};
