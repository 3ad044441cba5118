use chrono::{Duration, NaiveDate, Utc};
use rusty_lending::adapters::memory::{
    book_catalog::InMemoryBookCatalog, event_publisher::RecordingEventPublisher,
    stock_ledger::InMemoryStockLedger, user_directory::InMemoryUserDirectory,
};
use rusty_lending::application::loan::{
    REMINDER_LEAD_DAYS, ServiceDependencies, run_overdue_scan, run_reminder_scan,
};
use rusty_lending::domain::events::LoanEvent;
use rusty_lending::domain::loan::{Loan, LoanStatus};
use rusty_lending::domain::value_objects::{BookId, LoanId, UserId};
use rusty_lending::ports::event_publisher::{self, EventPublisher};
use rusty_lending::ports::loan_store::LoanStore;
use std::sync::Arc;

mod common;
use common::InMemoryLoanStore;

// ============================================================================
// テスト用モック実装
// ============================================================================

/// 特定の貸出のイベントだけ発行に失敗するパブリッシャー
struct FailingEventPublisher {
    fail_for: LoanId,
    delegate: RecordingEventPublisher,
}

impl FailingEventPublisher {
    fn new(fail_for: LoanId) -> Self {
        Self {
            fail_for,
            delegate: RecordingEventPublisher::new(),
        }
    }
}

#[async_trait::async_trait]
impl EventPublisher for FailingEventPublisher {
    async fn publish(&self, event: &LoanEvent) -> event_publisher::Result<()> {
        if event.loan_id() == self.fail_for {
            return Err("broker rejected the record".into());
        }
        self.delegate.publish(event).await
    }
}

// ============================================================================
// セットアップヘルパー
// ============================================================================

struct ScanContext {
    deps: ServiceDependencies,
    loan_store: Arc<InMemoryLoanStore>,
    publisher: Arc<RecordingEventPublisher>,
    user_directory: Arc<InMemoryUserDirectory>,
    book_catalog: Arc<InMemoryBookCatalog>,
}

fn setup() -> ScanContext {
    let loan_store = Arc::new(InMemoryLoanStore::new());
    let user_directory = Arc::new(InMemoryUserDirectory::new());
    let book_catalog = Arc::new(InMemoryBookCatalog::new());
    let publisher = Arc::new(RecordingEventPublisher::new());

    let deps = ServiceDependencies {
        stock_client: Arc::new(InMemoryStockLedger::new()),
        loan_store: loan_store.clone(),
        user_directory: user_directory.clone(),
        book_catalog: book_catalog.clone(),
        event_publisher: publisher.clone(),
    };

    ScanContext {
        deps,
        loan_store,
        publisher,
        user_directory,
        book_catalog,
    }
}

/// 指定した返却期限とステータスの貸出を登録する
fn seed_loan(
    ctx: &ScanContext,
    due_date: NaiveDate,
    status: LoanStatus,
    email: &str,
    title: &str,
) -> Loan {
    let user_id = UserId::new();
    let book_id = BookId::new();
    ctx.user_directory.add_user(user_id, email);
    ctx.book_catalog.add_book(book_id, title);

    let loan = Loan {
        loan_id: LoanId::new(),
        book_id,
        user_id,
        loan_date: due_date - Duration::days(14),
        due_date,
        returned_date: None,
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    ctx.loan_store.seed(loan.clone());
    loan
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ============================================================================
// 延滞スキャン
// ============================================================================

#[tokio::test]
async fn test_overdue_scan_transitions_past_due_loan_and_emits_event() {
    // Arrange: 返却期限が昨日の貸出
    let ctx = setup();
    let loan = seed_loan(
        &ctx,
        today() - Duration::days(1),
        LoanStatus::Borrowed,
        "reader@example.com",
        "Designing Data-Intensive Applications",
    );

    // Act
    let count = run_overdue_scan(&ctx.deps, today()).await.unwrap();

    // Assert: Overdueに遷移し、非正規化フィールド付きのイベントが1件発行される
    assert_eq!(count, 1);
    let stored = ctx.loan_store.find_by_id(loan.loan_id).await.unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Overdue);
    assert_eq!(stored.returned_date, None);

    let events = ctx.publisher.published();
    assert_eq!(events.len(), 1);
    match &events[0] {
        LoanEvent::Overdue(e) => {
            assert_eq!(e.loan_id, loan.loan_id);
            assert_eq!(e.due_date, loan.due_date);
            assert_eq!(e.book_title, "Designing Data-Intensive Applications");
            assert_eq!(e.user_email, "reader@example.com");
        }
        other => panic!("Expected LoanEvent::Overdue, got {:?}", other),
    }
}

#[tokio::test]
async fn test_overdue_scan_second_run_is_a_no_op() {
    // Arrange
    let ctx = setup();
    seed_loan(
        &ctx,
        today() - Duration::days(1),
        LoanStatus::Borrowed,
        "reader@example.com",
        "Designing Data-Intensive Applications",
    );

    // Act: 同じ状態で2回実行する
    let first = run_overdue_scan(&ctx.deps, today()).await.unwrap();
    let second = run_overdue_scan(&ctx.deps, today()).await.unwrap();

    // Assert: 既にOverdueの貸出はクエリから除外されるため2回目は何もしない
    assert_eq!(first, 1);
    assert_eq!(second, 0);
    assert_eq!(ctx.publisher.published().len(), 1);
}

#[tokio::test]
async fn test_overdue_scan_ignores_future_and_returned_loans() {
    // Arrange: 期限内・返却済み・期限当日の貸出
    let ctx = setup();
    seed_loan(
        &ctx,
        today() + Duration::days(3),
        LoanStatus::Borrowed,
        "a@example.com",
        "A",
    );
    let mut returned = seed_loan(
        &ctx,
        today() - Duration::days(5),
        LoanStatus::Returned,
        "b@example.com",
        "B",
    );
    returned.returned_date = Some(today() - Duration::days(2));
    ctx.loan_store.seed(returned);
    // 期限当日はまだ延滞ではない
    seed_loan(
        &ctx,
        today(),
        LoanStatus::Borrowed,
        "c@example.com",
        "C",
    );

    // Act
    let count = run_overdue_scan(&ctx.deps, today()).await.unwrap();

    // Assert
    assert_eq!(count, 0);
    assert!(ctx.publisher.published().is_empty());
}

#[tokio::test]
async fn test_overdue_scan_isolates_enrichment_failures() {
    // Arrange: 2件の延滞候補のうち1件の利用者がディレクトリに存在しない
    let ctx = setup();
    let healthy = seed_loan(
        &ctx,
        today() - Duration::days(1),
        LoanStatus::Borrowed,
        "reader@example.com",
        "A",
    );
    let orphan_user = UserId::new();
    let orphan_book = BookId::new();
    ctx.book_catalog.add_book(orphan_book, "B");
    let orphan = Loan {
        loan_id: LoanId::new(),
        book_id: orphan_book,
        user_id: orphan_user,
        loan_date: today() - Duration::days(15),
        due_date: today() - Duration::days(1),
        returned_date: None,
        status: LoanStatus::Borrowed,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    ctx.loan_store.seed(orphan.clone());

    // Act
    let count = run_overdue_scan(&ctx.deps, today()).await.unwrap();

    // Assert: 遷移は両方とも行われ、イベントは取得に成功した1件のみ。
    // 取得失敗は遷移をロールバックしない。
    assert_eq!(count, 2);
    let stored_orphan = ctx.loan_store.find_by_id(orphan.loan_id).await.unwrap().unwrap();
    assert_eq!(stored_orphan.status, LoanStatus::Overdue);
    let stored_healthy = ctx.loan_store.find_by_id(healthy.loan_id).await.unwrap().unwrap();
    assert_eq!(stored_healthy.status, LoanStatus::Overdue);

    let events = ctx.publisher.published();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].loan_id(), healthy.loan_id);
}

#[tokio::test]
async fn test_overdue_scan_isolates_publish_failures() {
    // Arrange: 1件だけ発行に失敗するパブリッシャー
    let ctx = setup();
    let failing = seed_loan(
        &ctx,
        today() - Duration::days(2),
        LoanStatus::Borrowed,
        "x@example.com",
        "X",
    );
    let healthy = seed_loan(
        &ctx,
        today() - Duration::days(1),
        LoanStatus::Borrowed,
        "y@example.com",
        "Y",
    );

    let publisher = Arc::new(FailingEventPublisher::new(failing.loan_id));
    let deps = ServiceDependencies {
        event_publisher: publisher.clone(),
        ..ctx.deps.clone()
    };

    // Act
    let count = run_overdue_scan(&deps, today()).await.unwrap();

    // Assert: 発行失敗は遷移を妨げずロールバックもしない
    assert_eq!(count, 2);
    for loan_id in [failing.loan_id, healthy.loan_id] {
        let stored = ctx.loan_store.find_by_id(loan_id).await.unwrap().unwrap();
        assert_eq!(stored.status, LoanStatus::Overdue);
    }
    let delivered = publisher.delegate.published();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].loan_id(), healthy.loan_id);
}

// ============================================================================
// リマインダースキャン
// ============================================================================

#[tokio::test]
async fn test_reminder_scan_emits_only_for_lead_day() {
    // Arrange: 期限までの残り日数が異なる3件の貸出
    let ctx = setup();
    let target = seed_loan(
        &ctx,
        today() + Duration::days(REMINDER_LEAD_DAYS),
        LoanStatus::Borrowed,
        "reader@example.com",
        "The Rust Programming Language",
    );
    seed_loan(
        &ctx,
        today() + Duration::days(REMINDER_LEAD_DAYS - 1),
        LoanStatus::Borrowed,
        "a@example.com",
        "A",
    );
    seed_loan(
        &ctx,
        today() + Duration::days(REMINDER_LEAD_DAYS + 1),
        LoanStatus::Borrowed,
        "b@example.com",
        "B",
    );

    // Act
    let count = run_reminder_scan(&ctx.deps, today()).await.unwrap();

    // Assert: 該当日の貸出だけにリマインダーが発行され、ステータスは変化しない
    assert_eq!(count, 1);
    let events = ctx.publisher.published();
    assert_eq!(events.len(), 1);
    match &events[0] {
        LoanEvent::Reminder(e) => {
            assert_eq!(e.loan_id, target.loan_id);
            assert_eq!(e.due_date, target.due_date);
            assert_eq!(e.book_title, "The Rust Programming Language");
            assert_eq!(e.user_email, "reader@example.com");
        }
        other => panic!("Expected LoanEvent::Reminder, got {:?}", other),
    }

    let stored = ctx.loan_store.find_by_id(target.loan_id).await.unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Borrowed);
}

#[tokio::test]
async fn test_reminder_scan_repeated_runs_emit_again() {
    // Arrange
    let ctx = setup();
    seed_loan(
        &ctx,
        today() + Duration::days(REMINDER_LEAD_DAYS),
        LoanStatus::Borrowed,
        "reader@example.com",
        "A",
    );

    // Act: 同じ日に2回実行する
    run_reminder_scan(&ctx.deps, today()).await.unwrap();
    run_reminder_scan(&ctx.deps, today()).await.unwrap();

    // Assert: 実行をまたいだ重複排除は行われない（下流の冪等性に委ねる）
    assert_eq!(ctx.publisher.published().len(), 2);
}

#[tokio::test]
async fn test_reminder_scan_isolates_publish_failures() {
    // Arrange
    let ctx = setup();
    let failing = seed_loan(
        &ctx,
        today() + Duration::days(REMINDER_LEAD_DAYS),
        LoanStatus::Borrowed,
        "x@example.com",
        "X",
    );
    let healthy = seed_loan(
        &ctx,
        today() + Duration::days(REMINDER_LEAD_DAYS),
        LoanStatus::Borrowed,
        "y@example.com",
        "Y",
    );

    let publisher = Arc::new(FailingEventPublisher::new(failing.loan_id));
    let deps = ServiceDependencies {
        event_publisher: publisher.clone(),
        ..ctx.deps.clone()
    };

    // Act
    let count = run_reminder_scan(&deps, today()).await.unwrap();

    // Assert: 失敗した1件を除いて発行され、件数は成功分のみ
    assert_eq!(count, 1);
    let delivered = publisher.delegate.published();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].loan_id(), healthy.loan_id);
}
