pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod storage;
pub mod store;

pub use error::AppError;
pub use store::TaskStore;
