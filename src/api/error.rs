use crate::application::loan::LoanServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LoanServiceError);

impl From<LoanServiceError> for ApiError {
    fn from(err: LoanServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            LoanServiceError::LoanNotFound => {
                (StatusCode::NOT_FOUND, "LOAN_NOT_FOUND", "Loan not found")
            }
            LoanServiceError::UserNotFound => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found")
            }
            LoanServiceError::BookNotFound => {
                (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", "Book not found")
            }

            // 409 Conflict - 期待されるビジネス上の拒否。状態は壊れていない。
            LoanServiceError::BookNotAvailable => (
                StatusCode::CONFLICT,
                "BOOK_NOT_AVAILABLE",
                "Book is not available for borrowing",
            ),
            LoanServiceError::BookAlreadyBorrowed => (
                StatusCode::CONFLICT,
                "BOOK_ALREADY_BORROWED",
                "User already has an active loan for this book",
            ),
            LoanServiceError::LoanAlreadyReturned => (
                StatusCode::CONFLICT,
                "LOAN_ALREADY_RETURNED",
                "Loan has already been returned",
            ),
            LoanServiceError::StockInconsistency { .. } => (
                StatusCode::CONFLICT,
                "STOCK_INCONSISTENCY",
                "Stock ledger rejected the operation; please retry after reconciliation",
            ),

            // 503 Service Unavailable - 在庫サービス到達不能。呼び出し側でリトライ可能。
            LoanServiceError::Communication(ref e) => {
                tracing::warn!("Stock service communication failure: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STOCK_SERVICE_UNAVAILABLE",
                    "Stock service is unreachable, please retry",
                )
            }

            // 500 Internal Server Error - システム障害
            // 補償失敗は通常の障害と区別して記録する。台帳が乖離している
            // 可能性があり、運用者による照合が必要。
            LoanServiceError::IntegrityAlarm { book_id, ref detail } => {
                tracing::error!(%book_id, detail = %detail, "integrity alarm: ledgers may have diverged");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTEGRITY_ALARM",
                    "The system may be in an inconsistent state; operators have been notified",
                )
            }
            LoanServiceError::StoreError(ref e) => {
                tracing::error!("Loan store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LOAN_STORE_ERROR",
                    "Failed to access loan records",
                )
            }
            LoanServiceError::DirectoryError(ref e) => {
                tracing::error!("User directory error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "USER_DIRECTORY_ERROR",
                    "User directory error",
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
