use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, UserId};

/// イベント：貸出が作成された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCreated {
    pub loan_id: LoanId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    // 通知整形用の非正規化フィールド（発行時に取得、保存しない）
    pub book_title: String,
    pub user_email: String,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanReturned {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub loan_date: NaiveDate,
    pub returned_date: NaiveDate,
}

/// イベント：貸出が延滞した
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOverdue {
    pub loan_id: LoanId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub book_title: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub user_email: String,
}

/// イベント：返却期限が近づいている
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanReminder {
    pub loan_id: LoanId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub book_title: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub user_email: String,
}

/// 貸出イベント統合型
///
/// 追記専用のイベントシンクにloan_idをキーとして発行される不変の事実。
/// 同一loan_idのイベントは発行順に配信される（パーティション順序保証）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanEvent {
    Created(LoanCreated),
    Returned(LoanReturned),
    Overdue(LoanOverdue),
    Reminder(LoanReminder),
}

impl LoanEvent {
    /// パーティションキーとなる貸出ID
    pub fn loan_id(&self) -> LoanId {
        match self {
            LoanEvent::Created(e) => e.loan_id,
            LoanEvent::Returned(e) => e.loan_id,
            LoanEvent::Overdue(e) => e.loan_id,
            LoanEvent::Reminder(e) => e.loan_id,
        }
    }
}
