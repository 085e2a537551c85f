//! `deskgate-auth` — already-authorized inputs to navigation resolution.
//!
//! Nothing here authenticates or enforces anything; these types only carry
//! what the backend said the user may see.

pub mod permissions;
pub mod principal;
pub mod roles;

pub use permissions::{ModulePermission, PermissionMap};
pub use principal::{CompanyProfile, PermissionSet, PrincipalId, UserContext, UserTypeProfile};
pub use roles::SidebarAssignment;
