use crate::domain::loan::Loan;
use crate::domain::value_objects::{BookId, LoanId, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出レコードストアポート
///
/// 貸出エンティティの永続化とステータス検索を抽象化する。
/// 書き込みは常に1件の貸出行のみを対象とし、複数行トランザクションは
/// 要求しない。
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// 貸出を保存する
    ///
    /// 新規の場合はINSERT、既存の場合はUPDATE（upsert）を実行する。
    async fn save(&self, loan: Loan) -> Result<()>;

    /// IDで貸出を取得する
    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 利用者と書籍の組に対する有効な貸出を検索する
    ///
    /// 有効な貸出 = BorrowedまたはOverdue。重複貸出の検出に使用される。
    async fn find_active(&self, user_id: UserId, book_id: BookId) -> Result<Option<Loan>>;

    /// 返却期限を過ぎた貸出中の貸出を検索する
    ///
    /// due_date < cutoff かつ status = Borrowed の貸出を返す。
    /// Overdueは除外されるため、延滞スキャナの繰り返し実行は自然に冪等になる。
    async fn find_borrowed_due_before(&self, cutoff: NaiveDate) -> Result<Vec<Loan>>;

    /// 指定日に返却期限を迎える貸出中の貸出を検索する
    ///
    /// リマインダースキャナに使用される。
    async fn find_borrowed_due_on(&self, due_on: NaiveDate) -> Result<Vec<Loan>>;
}
