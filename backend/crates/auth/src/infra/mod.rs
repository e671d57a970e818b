//! Infrastructure Layer
//!
//! Concrete session stores and the identity provider adapter.

pub mod cognito;
pub mod memory;
pub mod postgres;
pub mod secrets;
