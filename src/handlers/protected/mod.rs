// Protected handlers. Every handler here receives an `AuthContext` extension.
pub mod customers;
