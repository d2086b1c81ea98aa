//! HTTP API: routing, request/response mapping and principal resolution.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
