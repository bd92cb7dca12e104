use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database operation failed")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    Conflict(String),
}

impl StoreError {
    /// Like `From<sqlx::Error>`, except that unique constraint violations become `Conflict(what)`.
    pub fn on_insert(e: sqlx::Error, what: impl ToString) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict(what.to_string())
            }
            _ => StoreError::Database(e),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn other_errors_stay_database_errors() {
        assert!(matches!(
            StoreError::on_insert(sqlx::Error::RowNotFound, "slug ski"),
            StoreError::Database(sqlx::Error::RowNotFound)
        ));
    }
}
