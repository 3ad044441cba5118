use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::loan::Loan;

/// 貸出作成のクエリパラメータ（POST /loans/borrow?userId=…&bookId=…）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowQuery {
    pub user_id: Uuid,
    pub book_id: Uuid,
}

/// 貸出レスポンス
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            loan_id: loan.loan_id.value(),
            book_id: loan.book_id.value(),
            user_id: loan.user_id.value(),
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            returned_date: loan.returned_date,
            status: loan.status.as_str().to_string(),
            created_at: loan.created_at,
            updated_at: loan.updated_at,
        }
    }
}

/// エラーレスポンス
///
/// 安定したエラー種別と人間可読のメッセージのみを返す。
/// スタックトレースや内部識別子は境界を越えない。
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
