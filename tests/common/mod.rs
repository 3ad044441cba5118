#![allow(dead_code)]

use chrono::NaiveDate;
use rusty_lending::domain::loan::Loan;
use rusty_lending::domain::value_objects::{BookId, LoanId, UserId};
use rusty_lending::ports::loan_store::{self, LoanStore};
use std::collections::HashMap;
use std::sync::Mutex;

/// インメモリLoanStore実装（テスト用）
pub struct InMemoryLoanStore {
    loans: Mutex<HashMap<LoanId, Loan>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self {
            loans: Mutex::new(HashMap::new()),
        }
    }

    /// テスト用に貸出を直接登録する
    pub fn seed(&self, loan: Loan) {
        self.loans.lock().unwrap().insert(loan.loan_id, loan);
    }

    pub fn len(&self) -> usize {
        self.loans.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn save(&self, loan: Loan) -> loan_store::Result<()> {
        self.loans.lock().unwrap().insert(loan.loan_id, loan);
        Ok(())
    }

    async fn find_by_id(&self, loan_id: LoanId) -> loan_store::Result<Option<Loan>> {
        Ok(self.loans.lock().unwrap().get(&loan_id).cloned())
    }

    async fn find_active(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> loan_store::Result<Option<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .values()
            .find(|l| l.user_id == user_id && l.book_id == book_id && l.is_active())
            .cloned())
    }

    async fn find_borrowed_due_before(&self, cutoff: NaiveDate) -> loan_store::Result<Vec<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| {
                matches!(l.status, rusty_lending::domain::loan::LoanStatus::Borrowed)
                    && l.due_date < cutoff
            })
            .cloned()
            .collect())
    }

    async fn find_borrowed_due_on(&self, due_on: NaiveDate) -> loan_store::Result<Vec<Loan>> {
        Ok(self
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|l| {
                matches!(l.status, rusty_lending::domain::loan::LoanStatus::Borrowed)
                    && l.due_date == due_on
            })
            .cloned()
            .collect())
    }
}
