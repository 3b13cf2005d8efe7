// handlers/protected/mod.rs - Protected handlers (token required)
//
// Every route here sits behind jwt_auth_middleware, so handlers can take
// Extension<AuthUser> without checking for it.

pub mod applications;
