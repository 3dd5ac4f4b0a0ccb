// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition endpoints. Every input is untrusted, so these handlers
// lean entirely on the validators before touching the store.

pub mod auth;
