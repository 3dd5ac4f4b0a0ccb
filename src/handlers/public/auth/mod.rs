// handlers/public/auth/mod.rs - Signup and login

pub mod login;  // POST /api/v1/auth/login
pub mod signup; // POST /api/v1/auth/signup

pub use login::login_post;
pub use signup::signup_post;
