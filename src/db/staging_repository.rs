use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};

use crate::db::DbError;
use crate::staging::StagingRecord;

pub const STAGING_SCHEMA: &str = "staging";
pub const STAGING_TABLE: &str = "online_retail";

/// Rows per multi-row INSERT statement
pub const INSERT_BATCH_SIZE: usize = 5000;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE staging.online_retail (
    "InvoiceNo"   TEXT,
    "StockCode"   TEXT,
    "Description" TEXT,
    "Quantity"    BIGINT,
    "InvoiceDate" TIMESTAMP,
    "UnitPrice"   DOUBLE PRECISION,
    "CustomerID"  BIGINT,
    "Country"     TEXT
)
"#;

#[derive(Clone)]
pub struct StagingRepository {
    pool: PgPool,
}

impl StagingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace the entire contents of staging.online_retail with `records`.
    ///
    /// Runs in a single transaction: the table is dropped and recreated,
    /// rows are inserted in batches, and the final row count is re-queried
    /// from the table before commit. Returns that count.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn replace_all(&self, records: &[StagingRecord]) -> Result<i64, DbError> {
        debug!(
            "Beginning transaction to replace {}.{} with {} rows",
            STAGING_SCHEMA,
            STAGING_TABLE,
            records.len()
        );
        let mut tx = self.pool.begin().await?;

        sqlx::query("CREATE SCHEMA IF NOT EXISTS staging")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS staging.online_retail")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_TABLE_SQL).execute(&mut *tx).await?;

        for chunk in records.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO staging.online_retail
                ("InvoiceNo", "StockCode", "Description", "Quantity",
                 "InvoiceDate", "UnitPrice", "CustomerID", "Country") "#,
            );
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.invoice_no.as_deref())
                    .push_bind(record.stock_code.as_deref())
                    .push_bind(record.description.as_deref())
                    .push_bind(record.quantity)
                    .push_bind(record.invoice_date)
                    .push_bind(record.unit_price)
                    .push_bind(record.customer_id)
                    .push_bind(record.country.as_deref());
            });
            builder.build().execute(&mut *tx).await?;
            debug!("Inserted batch of {} rows", chunk.len());
        }

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staging.online_retail")
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(
            "Replaced {}.{}, table now holds {} rows",
            STAGING_SCHEMA, STAGING_TABLE, total
        );
        Ok(total)
    }

    /// Row count of the staging table
    pub async fn count(&self) -> Result<i64, DbError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staging.online_retail")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
