use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, MarkOverdueError, ReturnLoanError, UserId};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// 貸出ステータス
///
/// 許可される遷移は Borrowed→Overdue→Returned と Borrowed→Returned のみ。
/// Overdue への遷移は延滞スキャナだけが行い、Returned への遷移は
/// 返却オペレーションだけが行う。逆方向の遷移は存在しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// 貸出中
    Borrowed,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "borrowed",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }

    /// 有効な貸出（未返却）か
    pub fn is_active(&self) -> bool {
        matches!(self, LoanStatus::Borrowed | LoanStatus::Overdue)
    }

    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(LoanStatus::Borrowed),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// Loan集約 - 1冊の書籍の1回の貸出
///
/// 不変条件：returned_date は status が Returned のときに限り Some。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 識別子
    pub loan_id: LoanId,

    // 他サービスが所有する資源への参照（IDのみ）
    pub book_id: BookId,
    pub user_id: UserId,

    // 貸出管理の責務
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
    pub status: LoanStatus,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// 有効な貸出（BorrowedまたはOverdue）か
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 貸出期間は14日間
/// - 初期状態はBorrowed
///
/// 副作用なし。新しいLoanを返す。
pub fn borrow_loan(book_id: BookId, user_id: UserId, loan_date: NaiveDate, now: DateTime<Utc>) -> Loan {
    Loan {
        loan_id: LoanId::new(),
        book_id,
        user_id,
        loan_date,
        due_date: loan_date + Duration::days(LOAN_PERIOD_DAYS),
        returned_date: None,
        status: LoanStatus::Borrowed,
        created_at: now,
        updated_at: now,
    }
}

/// 純粋関数：貸出を返却済みにする
///
/// ビジネスルール：
/// - BorrowedまたはOverdueから返却可能（延滞していても返却は受け付ける）
/// - returned_dateは返却時に限り設定される
///
/// 副作用なし。新しいLoanを返す。
pub fn mark_returned(
    loan: &Loan,
    returned_on: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Loan, ReturnLoanError> {
    if loan.status.is_returned() {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    Ok(Loan {
        returned_date: Some(returned_on),
        status: LoanStatus::Returned,
        updated_at: now,
        ..loan.clone()
    })
}

/// 純粋関数：貸出を延滞にする
///
/// ビジネスルール：
/// - Borrowedからのみ遷移可能（重複遷移の防止）
/// - 返却期限を過ぎた貸出のみ対象
///
/// 副作用なし。新しいLoanを返す。
pub fn mark_overdue(
    loan: &Loan,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Loan, MarkOverdueError> {
    if loan.status != LoanStatus::Borrowed {
        return Err(MarkOverdueError::NotBorrowed);
    }
    if loan.due_date >= today {
        return Err(MarkOverdueError::NotPastDue);
    }

    Ok(Loan {
        status: LoanStatus::Overdue,
        updated_at: now,
        ..loan.clone()
    })
}

/// 純粋関数：延滞判定
pub fn is_past_due(loan: &Loan, today: NaiveDate) -> bool {
    loan.is_active() && loan.due_date < today
}
