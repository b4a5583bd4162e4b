//! # pb-auth
//!
//! Authentication and authorization for Pulseboard: JWT tokens, password
//! hashing, and the role-based permission context.

pub mod jwt;
pub mod password;
pub mod permissions;

pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use password::{hash_password, verify_password, PasswordError};
pub use permissions::CurrentUser;
