//! Credential primitives library
//!
//! Provides the building blocks the identity service signs and checks
//! credentials with:
//! - Password hashing (Argon2id)
//! - Signed login token issuance and verification (HS256 JWT)
//!
//! The library holds no state beyond the signing keys and performs no I/O,
//! so a single instance can be shared freely across request handlers.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Signed Tokens
//! ```
//! use auth::{Claims, TokenSigner};
//! use chrono::Duration;
//!
//! let signer = TokenSigner::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::for_login("42", "alice", "alice@example.com", ["ROLE_EMPLOYEE"], true);
//! let (token, expires_at) = signer.issue(claims, Duration::hours(4)).unwrap();
//! let decoded = signer.verify(&token).unwrap();
//! assert_eq!(decoded.exp, Some(expires_at));
//! ```

pub mod jwt;
pub mod password;

pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenSigner;
pub use password::PasswordError;
pub use password::PasswordHasher;
