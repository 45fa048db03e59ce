pub mod error;
pub mod staging_repository;

pub use error::DbError;
pub use staging_repository::StagingRepository;
