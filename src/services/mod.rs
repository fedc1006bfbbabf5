pub mod customer_service;
pub mod order_stats;

pub use customer_service::{CustomerDetail, CustomerError, CustomerService, PatchOutcome};
pub use order_stats::{OrderStatistics, TaxBreakdown};
