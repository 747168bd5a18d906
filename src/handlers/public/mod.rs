// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, password reset, the certificate verification page and
// service probes. Paths are listed in `middleware::auth::PUBLIC_ROUTES`.

pub mod auth;
pub mod system;
pub mod verify;

pub use system::{health, root};
