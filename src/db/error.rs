#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Staging load failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}
