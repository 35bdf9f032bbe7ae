pub mod dispatch_service;
pub use dispatch_service::DispatchService;
pub mod process_service;
pub use process_service::{ProcessService, WorkerSettings};
