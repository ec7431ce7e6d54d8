//! HTTP surface: routing, auth middleware, JSON error mapping and startup.

pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;

pub use startup::run;
