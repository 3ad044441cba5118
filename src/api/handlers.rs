use crate::application::loan::{
    LoanServiceError, ServiceDependencies, borrow_book as execute_borrow_book,
    return_loan as execute_return_loan,
};
use crate::domain::commands::{BorrowBook, ReturnLoan};
use crate::domain::value_objects::{BookId, LoanId, UserId};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{BorrowQuery, LoanResponse},
};

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// POST /loans/borrow?userId=…&bookId=… - 書籍を借りる
///
/// 強制されるビジネスルール:
/// - 利用者が存在すること
/// - 書籍に貸出可能な在庫があること
/// - 同じ書籍の有効な貸出がないこと
///
/// クエリパラメータの不正（UUIDでない等）はaxumが400で拒否する。
pub async fn borrow_loan(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BorrowQuery>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let cmd = BorrowBook {
        user_id: UserId::from_uuid(query.user_id),
        book_id: BookId::from_uuid(query.book_id),
        loan_date: chrono::Utc::now().date_naive(),
    };

    let loan = execute_borrow_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(loan))))
}

/// PUT /loans/:id/return - 貸出を返却する
///
/// 強制されるビジネスルール:
/// - 貸出が存在すること
/// - 既に返却済みでないこと
/// - 延滞中の貸出も返却可能
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = ReturnLoan {
        loan_id: LoanId::from_uuid(loan_id),
        returned_on: chrono::Utc::now().date_naive(),
    };

    let loan = execute_return_loan(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(loan)))
}

/// GET /loans/:id - 貸出詳細をIDで取得
pub async fn get_loan_by_id(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan_id = LoanId::from_uuid(loan_id);

    let loan = state
        .service_deps
        .loan_store
        .find_by_id(loan_id)
        .await
        .map_err(|e| ApiError::from(LoanServiceError::StoreError(e)))?
        .ok_or_else(|| ApiError::from(LoanServiceError::LoanNotFound))?;

    Ok(Json(LoanResponse::from(loan)))
}
