// handlers/protected/account/mod.rs - Account settings endpoints

pub mod reminder; // GET, PUT /api/v1/account/reminder
