// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// The route guard has already validated the bearer token and inserted
// `AuthUser` into request extensions by the time these run.

pub mod auth;
pub mod dashboard;
pub mod qr_codes;
