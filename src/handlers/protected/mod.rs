// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `jwt_auth_middleware`, which injects
// `AuthUser`. Handlers never see a request without one.

pub mod account; // Reminder settings for the caller's account
pub mod entries; // Diary entry CRUD scoped to the caller
