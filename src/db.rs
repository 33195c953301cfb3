//! SQLite position store
//!
//! One row per open position, keyed by symbol. Every public method is a single
//! statement or a single transaction, so readers never see a partial row.

use crate::types::Position;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(path: &str) -> Result<Self> {
        let in_memory = matches!(path, ":memory:" | "sqlite::memory:");

        let options = SqliteConnectOptions::from_str(path)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        // An in-memory database lives and dies with its connection
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.initialize().await?;

        Ok(db)
    }

    /// Private in-memory store, used by tests and dry runs
    pub async fn in_memory() -> Result<Self> {
        Self::new(":memory:").await
    }

    /// Initialize database schema
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS positions (
                symbol TEXT PRIMARY KEY,
                quantity TEXT NOT NULL,
                entry_price TEXT NOT NULL,
                entry_time TEXT NOT NULL,
                high_price TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database initialized");
        Ok(())
    }

    /// Insert or replace the position for its symbol
    pub async fn upsert_position(&self, position: &Position) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO positions (symbol, quantity, entry_price, entry_time, high_price)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(symbol) DO UPDATE SET
                quantity = excluded.quantity,
                entry_price = excluded.entry_price,
                entry_time = excluded.entry_time,
                high_price = excluded.high_price
            "#,
        )
        .bind(&position.symbol)
        .bind(position.quantity.to_string())
        .bind(position.entry_price.to_string())
        .bind(position.entry_time.to_rfc3339())
        .bind(position.high_price.to_string())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert position {}", position.symbol))?;
        Ok(())
    }

    /// Raise the stored high-water mark if `price` exceeds it.
    ///
    /// Returns the high after the update, or `None` if no position exists.
    pub async fn raise_high_price(&self, symbol: &str, price: Decimal) -> Result<Option<Decimal>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> =
            sqlx::query_as("SELECT high_price FROM positions WHERE symbol = ?")
                .bind(symbol)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((stored,)) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let stored = parse_decimal(&stored, "high_price")?;
        if price <= stored {
            tx.commit().await?;
            return Ok(Some(stored));
        }

        sqlx::query("UPDATE positions SET high_price = ? WHERE symbol = ?")
            .bind(price.to_string())
            .bind(symbol)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("New high for {}: {} (was {})", symbol, price, stored);
        Ok(Some(price))
    }

    /// Remove a position. Returns whether a row was deleted.
    pub async fn delete_position(&self, symbol: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM positions WHERE symbol = ?")
            .bind(symbol)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete position {}", symbol))?;
        Ok(result.rows_affected() > 0)
    }

    /// Get all open positions, oldest first
    pub async fn get_positions(&self) -> Result<Vec<Position>> {
        let rows = sqlx::query("SELECT * FROM positions ORDER BY entry_time, symbol")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_position).collect()
    }

    /// Get the position for a symbol
    pub async fn get_position(&self, symbol: &str) -> Result<Option<Position>> {
        let row = sqlx::query("SELECT * FROM positions WHERE symbol = ?")
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_position).transpose()
    }

    pub async fn has_position(&self, symbol: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM positions WHERE symbol = ?")
            .bind(symbol)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn count_positions(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM positions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn row_to_position(row: &SqliteRow) -> Result<Position> {
    let entry_time: String = row.try_get("entry_time")?;
    let entry_time = DateTime::parse_from_rfc3339(&entry_time)
        .context("Invalid entry_time")?
        .with_timezone(&Utc);

    Ok(Position {
        symbol: row.try_get("symbol")?,
        quantity: parse_decimal(&row.try_get::<String, _>("quantity")?, "quantity")?,
        entry_price: parse_decimal(&row.try_get::<String, _>("entry_price")?, "entry_price")?,
        entry_time,
        high_price: parse_decimal(&row.try_get::<String, _>("high_price")?, "high_price")?,
    })
}

fn parse_decimal(value: &str, column: &str) -> Result<Decimal> {
    Decimal::from_str(value).with_context(|| format!("Invalid {}: {}", column, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn position(symbol: &str, entry: Decimal) -> Position {
        Position {
            symbol: symbol.to_string(),
            quantity: dec!(12.5),
            entry_price: entry,
            entry_time: Utc::now(),
            high_price: entry,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let db = Database::in_memory().await.unwrap();

        db.upsert_position(&position("ABCUSDT", dec!(1))).await.unwrap();
        db.upsert_position(&position("ABCUSDT", dec!(2))).await.unwrap();

        assert_eq!(db.count_positions().await.unwrap(), 1);
        let stored = db.get_position("ABCUSDT").await.unwrap().unwrap();
        assert_eq!(stored.entry_price, dec!(2));
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let db = Database::in_memory().await.unwrap();
        let mut original = position("XYZUSDT", dec!(0.000123));
        original.entry_time = Utc::now() - Duration::seconds(30);

        db.upsert_position(&original).await.unwrap();
        let stored = db.get_position("XYZUSDT").await.unwrap().unwrap();

        assert_eq!(stored.symbol, original.symbol);
        assert_eq!(stored.quantity, original.quantity);
        assert_eq!(stored.entry_price, original.entry_price);
        assert_eq!(stored.high_price, original.high_price);
        assert_eq!(stored.entry_time.timestamp(), original.entry_time.timestamp());
    }

    #[tokio::test]
    async fn test_raise_high_price_is_monotonic() {
        let db = Database::in_memory().await.unwrap();
        db.upsert_position(&position("ABCUSDT", dec!(100))).await.unwrap();

        let observed = [dec!(120), dec!(110), dec!(150), dec!(90), dec!(149)];
        let mut last = dec!(100);
        for price in observed {
            let high = db.raise_high_price("ABCUSDT", price).await.unwrap().unwrap();
            assert!(high >= last);
            last = high;
        }

        let stored = db.get_position("ABCUSDT").await.unwrap().unwrap();
        assert_eq!(stored.high_price, dec!(150));
    }

    #[tokio::test]
    async fn test_raise_high_price_missing_symbol() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.raise_high_price("NONE", dec!(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_position() {
        let db = Database::in_memory().await.unwrap();
        db.upsert_position(&position("ABCUSDT", dec!(1))).await.unwrap();

        assert!(db.has_position("ABCUSDT").await.unwrap());
        assert!(db.delete_position("ABCUSDT").await.unwrap());
        assert!(!db.delete_position("ABCUSDT").await.unwrap());
        assert!(!db.has_position("ABCUSDT").await.unwrap());
        assert!(db.get_positions().await.unwrap().is_empty());
    }
}
