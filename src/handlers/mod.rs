// handlers/mod.rs - two security tiers
//
// Public (no session) → Protected (bearer JWT, enforced by the route guard)
pub mod public;
pub mod protected;
