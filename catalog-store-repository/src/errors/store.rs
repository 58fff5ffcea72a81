use thiserror::Error;

#[derive(Debug, Error)]
/// Represents errors that can occur while reading the primary store.
///
/// A missing record is not an error: lookups return `Ok(None)` instead.
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Stored data that cannot be turned into a catalog record.
    #[error("Data error: {0}")]
    DataError(String),
}

impl StoreError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::DataError(msg.into())
    }
}
