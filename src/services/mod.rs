// Service exports
pub mod store;

pub use store::{DonorStore, PostgresDonorStore, StoreError};
