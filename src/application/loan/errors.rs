use crate::domain::value_objects::BookId;
use crate::ports::stock_client::CommunicationFailure;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
///
/// 分類：
/// - NotFound系（UserNotFound, BookNotFound, LoanNotFound）
/// - Conflict系（BookNotAvailable, BookAlreadyBorrowed, LoanAlreadyReturned, StockInconsistency）
/// - Communication：在庫サービス到達不能。ローカル状態は変更されておらず、呼び出し側でリトライ可能。
/// - IntegrityAlarm：補償自体の失敗。自動リトライ不可、運用者による照合が必要。
#[derive(Debug, Error)]
pub enum LoanServiceError {
    /// 利用者が存在しない
    #[error("User not found")]
    UserNotFound,

    /// 書籍が在庫サービスに存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 貸出可能な在庫がない
    #[error("Book is not available for borrowing")]
    BookNotAvailable,

    /// 同じ書籍の有効な貸出が既にある
    #[error("User already has an active loan for this book")]
    BookAlreadyBorrowed,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 既に返却済み
    #[error("Loan has already been returned")]
    LoanAlreadyReturned,

    /// 在庫台帳が返却を拒否した（貸出台帳と在庫台帳の不整合）
    #[error("Stock ledger rejected the release for book {book_id}")]
    StockInconsistency { book_id: BookId },

    /// 在庫サービスとの通信失敗
    #[error("Stock service communication failure")]
    Communication(#[source] CommunicationFailure),

    /// 補償（在庫戻し）自体が失敗した
    ///
    /// 予約が在庫台帳に残留した可能性がある。二つの台帳が乖離して
    /// いるため、自動リトライではなく運用者による照合を要する。
    #[error("compensating release failed for book {book_id}: {detail}")]
    IntegrityAlarm { book_id: BookId, detail: String },

    /// 貸出ストアのエラー
    #[error("Loan store error")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 利用者ディレクトリのエラー
    #[error("User directory error")]
    DirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanServiceError>;
