use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("validation_error - {0}")]
    Validation(String),
    #[error("not_found - {0}")]
    NotFound(String),
    #[error("store_read_error - {0}")]
    StoreRead(String),
    #[error("store_write_error - {0}")]
    StoreWrite(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
}

impl AppError {
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(id: u64) -> Self {
        Self::NotFound(format!("task {id} not found"))
    }

    pub fn store_read<M: Into<String>>(message: M) -> Self {
        Self::StoreRead(message.into())
    }

    pub fn store_write<M: Into<String>>(message: M) -> Self {
        Self::StoreWrite(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::StoreRead(_) => "store_read_error",
            Self::StoreWrite(_) => "store_write_error",
            Self::InvalidData(_) => "invalid_data",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::StoreRead(message)
            | Self::StoreWrite(message)
            | Self::InvalidData(message) => message,
        }
    }
}
