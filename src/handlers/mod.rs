// handlers/mod.rs - Two security tiers
//
// Public (no auth) -> Protected (signed token, per-resource ownership)

pub mod protected;
pub mod public;
