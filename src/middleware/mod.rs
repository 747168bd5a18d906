pub mod auth;
pub mod client;
pub mod response;

pub use auth::{is_public_route, route_guard, AuthUser};
pub use client::{request_origin, ClientInfo};
pub use response::{ApiResponse, ApiResult};
