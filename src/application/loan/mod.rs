mod errors;
mod orchestrator;
mod overdue_scanner;
mod reminder_scanner;

pub use errors::{LoanServiceError, Result};
pub use orchestrator::{ServiceDependencies, borrow_book, return_loan};
pub use overdue_scanner::run_overdue_scan;
pub use reminder_scanner::{REMINDER_LEAD_DAYS, run_reminder_scan};
