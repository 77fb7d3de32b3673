//! Test utilities for albaran services.
//!
//! Provides `MockAuth` session cookies and small binary fixtures.
//! Import from `[dev-dependencies]` only, never from production code.

pub mod auth;
pub mod fixture;
