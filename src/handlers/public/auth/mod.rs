// handlers/public/auth/mod.rs - Public authentication handlers

use serde::Deserialize;

pub mod login;    // POST /auth/login - authenticate and get JWT
pub mod register; // POST /auth/register - create new account
pub mod password; // POST /auth/password/{reset,update}

pub use login::login_post;
pub use password::{password_reset_post, password_update_post};
pub use register::register_post;

/// Body of login and register
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}
