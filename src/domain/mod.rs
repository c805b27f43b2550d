//! Typed view over the loosely structured records of the activity API.
//!
//! Every variant record decodes to a sum type with an `Other` case that keeps
//! the raw key, so unfamiliar shapes degrade to a label instead of failing.

pub mod action;
pub mod activity;
pub mod actor;
pub mod error;
pub mod keys;
pub mod target;
pub mod user;

pub use action::*;
pub use activity::*;
pub use actor::*;
pub use error::*;
pub use keys::FirstKey;
pub use target::*;
pub use user::*;
