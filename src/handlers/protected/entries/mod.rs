// handlers/protected/entries/mod.rs - Diary entry endpoints

pub mod collection; // GET, POST /api/v1/entries
pub mod record;     // GET, PUT, DELETE /api/v1/entries/:id
