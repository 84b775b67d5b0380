use crate::common::error::AppError;

// ---
// Helper: violação de chave única -> erro de domínio
// ---
/// Converte uma violação de UNIQUE do Postgres no erro informado;
/// qualquer outro erro continua sendo `DatabaseError`.
pub(crate) fn unique_violation_or(e: sqlx::Error, on_unique: AppError) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return on_unique;
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_database_errors() {
        let err = unique_violation_or(sqlx::Error::RowNotFound, AppError::EmailAlreadyExists);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
