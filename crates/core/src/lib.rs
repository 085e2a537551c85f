//! `deskgate-core` — navigation domain foundation.
//!
//! This crate contains **pure** primitives shared by the authorization inputs
//! and the resolution engine (no IO, no logging setup).

pub mod error;
pub mod id;

pub use error::{NavigationError, NavigationResult};
pub use id::{ModuleId, SubItemId};
