//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, token verification and the bootstrap admin live here;
//! HTTP concerns stay in the server crate.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AuthConfig, AuthService};
