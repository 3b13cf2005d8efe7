// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Enumeration lookups and the health probe. Nothing here reads AuthUser.

pub mod health;
pub mod types;
