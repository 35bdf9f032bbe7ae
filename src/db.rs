pub mod list_repo;
pub use list_repo::ListRepository;
