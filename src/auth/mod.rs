//! Authentication module
//!
//! Bearer-token validation and the capability extractors built on top of it.

pub mod capability;
pub mod jwt;
pub mod middleware;

pub use capability::{ActingUser, AdminCapability};
pub use jwt::{Claims, JwtService};
pub use middleware::JwtMiddleware;
