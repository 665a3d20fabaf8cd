//! HTTP handlers for the RPC surface named in spec §6: AuthService,
//! RoleService, PermissionService, UserService. Routed together in
//! `crate::router` (see `main.rs`).

pub mod auth;
pub mod permissions;
pub mod roles;
pub mod tenants;
pub mod users;
pub mod verification;
