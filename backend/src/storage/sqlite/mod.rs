pub mod connection;
pub mod record_repository;

pub use connection::DbConnection;
pub use record_repository::SqliteRecordRepository;
