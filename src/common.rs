pub mod error;
pub use error::{AppError, ErrorBody};
pub mod locks;
pub use locks::TenantLocks;
