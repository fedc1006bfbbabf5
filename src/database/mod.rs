pub mod manager;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{Customer, Order};
pub use postgres::{PgCustomerRepository, PgOrderRepository};
pub use repository::{CustomerChanges, CustomerQuery, CustomerRepository, OrderRepository};
