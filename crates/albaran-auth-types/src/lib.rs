//! Session authentication shared by the albaran service and its tests.
//!
//! Provides session-token issuing and validation, the session cookie builders,
//! and the `Identity` extractor that turns the cookie into an actor.

pub mod cookie;
pub mod identity;
pub mod token;
