pub mod types;

pub use types::{AppError, CatalogError, EnrichError, StoreError};
