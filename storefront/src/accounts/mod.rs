//! Accounts Module
//!
//! Registration with email verification, password login, saved shipping
//! addresses and the admin user table. Token issuance belongs to the
//! transport layer embedding the engine.

mod password;
mod service;

pub use password::{hash_password, verify_password};
pub use service::{AccountService, Registration};
