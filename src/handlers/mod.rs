// Two tiers: public (no credential) and protected (credential + active subscription).
// The protected tier is gated by `middleware::require_active_subscription` in `app::router`.
pub mod protected;
pub mod public;
