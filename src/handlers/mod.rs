// handlers/mod.rs - Two-tier handler architecture
//
// Public (no auth, /api/v1/auth/*) → Protected (bearer token, everything else
// under /api/v1). Service info and health checks sit outside the prefix.

pub mod protected;
pub mod public;
pub mod system;
pub mod utils;
