//! Authentication primitives: password hashing, bearer token issuance and
//! the request gate that combines token verification with revocation.

pub mod password;
pub mod token;
pub mod validator;

pub use password::{HashParams, PasswordHasher};
pub use token::{AuthConfig, Claims, TokenIssuer};
pub use validator::{bearer_token, TokenValidator};
