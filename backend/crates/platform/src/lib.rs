//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, SHA-256, Base64)
//! - Cookie management
//! - CSRF token issuance and verification

pub mod cookie;
pub mod crypto;
pub mod csrf;
