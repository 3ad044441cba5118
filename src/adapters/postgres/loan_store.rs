use crate::domain::loan::{Loan, LoanStatus};
use crate::domain::value_objects::{BookId, LoanId, UserId};
use crate::ports::loan_store::{LoanStore as LoanStoreTrait, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// Map a database row to a Loan.
///
/// The status column is stored as text and parsed back into the domain
/// enum; an unknown value is surfaced as an error rather than defaulted.
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let status_str: &str = row.get("status");
    let status = LoanStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Loan {
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        user_id: UserId::from_uuid(row.get("user_id")),
        loan_date: row.get("loan_date"),
        due_date: row.get("due_date"),
        returned_date: row.get("returned_date"),
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// PostgreSQL implementation of LoanStore.
///
/// Every write touches exactly one loan row; no multi-row transactions
/// are required by the callers.
pub struct PostgresLoanStore {
    pool: PgPool,
}

impl PostgresLoanStore {
    /// Create a new store from a PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStoreTrait for PostgresLoanStore {
    /// Save a loan (upsert).
    ///
    /// INSERT ... ON CONFLICT UPDATE keeps the write idempotent, so a
    /// retried save after a partial failure cannot duplicate a loan.
    async fn save(&self, loan: Loan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (
                loan_id,
                book_id,
                user_id,
                loan_date,
                due_date,
                returned_date,
                status,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (loan_id)
            DO UPDATE SET
                returned_date = EXCLUDED.returned_date,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.book_id.value())
        .bind(loan.user_id.value())
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.returned_date)
        .bind(loan.status.as_str())
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT
                loan_id,
                book_id,
                user_id,
                loan_date,
                due_date,
                returned_date,
                status,
                created_at,
                updated_at
            FROM loans
            WHERE loan_id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    /// Find the active loan for a (user, book) pair.
    ///
    /// Active = borrowed or overdue. Uses the partial index on
    /// (user_id, book_id) over active rows.
    async fn find_active(&self, user_id: UserId, book_id: BookId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT
                loan_id,
                book_id,
                user_id,
                loan_date,
                due_date,
                returned_date,
                status,
                created_at,
                updated_at
            FROM loans
            WHERE user_id = $1
              AND book_id = $2
              AND status IN ('borrowed', 'overdue')
            LIMIT 1
            "#,
        )
        .bind(user_id.value())
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    /// Find borrowed loans past their due date (overdue scan).
    ///
    /// Overdue rows are excluded by the status filter, which is what makes
    /// repeated scans idempotent with respect to the transition.
    async fn find_borrowed_due_before(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT
                loan_id,
                book_id,
                user_id,
                loan_date,
                due_date,
                returned_date,
                status,
                created_at,
                updated_at
            FROM loans
            WHERE status = 'borrowed' AND due_date < $1
            ORDER BY due_date ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    /// Find borrowed loans due exactly on the given date (reminder scan).
    async fn find_borrowed_due_on(&self, due_on: NaiveDate) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT
                loan_id,
                book_id,
                user_id,
                loan_date,
                due_date,
                returned_date,
                status,
                created_at,
                updated_at
            FROM loans
            WHERE status = 'borrowed' AND due_date = $1
            ORDER BY loan_date ASC
            "#,
        )
        .bind(due_on)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }
}
