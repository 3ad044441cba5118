use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, UserId};

/// コマンド：書籍を借りる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub user_id: UserId,
    pub book_id: BookId,
    pub loan_date: NaiveDate,
}

/// コマンド：貸出を返却する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLoan {
    pub loan_id: LoanId,
    pub returned_on: NaiveDate,
}
