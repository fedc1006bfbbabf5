pub mod format;

pub use format::{to_external_shape, CustomerDto, DeletedCustomerDto};
