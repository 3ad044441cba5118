use crate::domain::{self, commands::*, events::*, loan::Loan, value_objects::*};
use crate::ports::*;
use chrono::Utc;
use std::sync::Arc;

use super::errors::{LoanServiceError, Result};

/// サービスの依存関係
///
/// すべての依存が明示的なデータ構造として渡される。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
/// テストではフェイク実装に差し替えられる。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub stock_client: Arc<dyn StockClient>,
    pub loan_store: Arc<dyn LoanStore>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub book_catalog: Arc<dyn BookCatalog>,
    pub event_publisher: Arc<dyn EventPublisher>,
}

/// 補償：予約済みの在庫を戻す
///
/// 予約成功後に発覚した障害（重複貸出・永続化失敗）の取り消しに使う。
/// 補償呼び出し自体の失敗は握りつぶさず、IntegrityAlarmとして
/// エスカレーションする。予約が在庫台帳に残留し、二つの台帳が乖離
/// している可能性があるため、最高レベルでログに記録する。
async fn compensate_reservation(
    deps: &ServiceDependencies,
    book_id: BookId,
    context: &'static str,
) -> Result<()> {
    match deps.stock_client.try_release(book_id).await {
        Ok(ReleaseOutcome::Released) => Ok(()),
        Ok(outcome) => {
            tracing::error!(
                %book_id,
                context,
                ?outcome,
                "compensating release was rejected; a reservation may be leaked and requires manual reconciliation"
            );
            Err(LoanServiceError::IntegrityAlarm {
                book_id,
                detail: format!("release rejected with {:?} during {}", outcome, context),
            })
        }
        Err(e) => {
            tracing::error!(
                %book_id,
                context,
                error = %e,
                "compensating release failed; a reservation may be leaked and requires manual reconciliation"
            );
            Err(LoanServiceError::IntegrityAlarm {
                book_id,
                detail: format!("release failed during {}: {}", context, e),
            })
        }
    }
}

/// 通知整形用の非正規化フィールドを取得する
///
/// イベント発行時に取得され、保存はされない。
pub(super) async fn fetch_enrichment(
    deps: &ServiceDependencies,
    user_id: UserId,
    book_id: BookId,
) -> std::result::Result<(String, String), Box<dyn std::error::Error + Send + Sync>> {
    let book_title = deps.book_catalog.get_title(book_id).await?;
    let user_email = deps.user_directory.get_email(user_id).await?;
    Ok((book_title, user_email))
}

/// LoanCreatedイベントを発行する（ベストエフォート）
///
/// 貸出は既にコミット済みのため、取得・発行の失敗は警告ログに留める。
/// 配信保証はイベント発行側のat-least-once配信に委ねる。
async fn publish_created(deps: &ServiceDependencies, loan: &Loan) {
    let (book_title, user_email) = match fetch_enrichment(deps, loan.user_id, loan.book_id).await {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!(loan_id = %loan.loan_id, error = %e, "skipping LoanCreated event: enrichment failed");
            return;
        }
    };

    let event = LoanEvent::Created(LoanCreated {
        loan_id: loan.loan_id,
        user_id: loan.user_id,
        book_id: loan.book_id,
        loan_date: loan.loan_date,
        due_date: loan.due_date,
        book_title,
        user_email,
    });

    if let Err(e) = deps.event_publisher.publish(&event).await {
        tracing::warn!(loan_id = %loan.loan_id, error = %e, "failed to publish LoanCreated event");
    }
}

/// LoanReturnedイベントを発行する（ベストエフォート）
async fn publish_returned(deps: &ServiceDependencies, loan: &Loan) {
    let Some(returned_date) = loan.returned_date else {
        return;
    };

    let event = LoanEvent::Returned(LoanReturned {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        user_id: loan.user_id,
        loan_date: loan.loan_date,
        returned_date,
    });

    if let Err(e) = deps.event_publisher.publish(&event).await {
        tracing::warn!(loan_id = %loan.loan_id, error = %e, "failed to publish LoanReturned event");
    }
}

/// 書籍を借りる
///
/// 在庫台帳と貸出台帳にまたがるサガ。共有トランザクションは存在せず、
/// 予約後に発覚した障害は補償（在庫戻し）で取り消す。
///
/// ビジネスルール：
/// - 利用者が存在すること
/// - 書籍に貸出可能な在庫があること
/// - 同じ書籍の有効な貸出（BorrowedまたはOverdue）がないこと
///
/// 重複貸出の確認は予約の**後**に行う。これは観察された順序であり、
/// 予約前のクロスリソースロックを不要にする代わりに、一時的な二重
/// 予約を補償で解消するトレードオフになっている。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 貸出コマンド
///
/// # 戻り値
/// 成功時は作成された貸出
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<Loan> {
    // 0. 利用者の存在確認（副作用が発生する前に行う）
    let user_exists = deps
        .user_directory
        .exists(cmd.user_id)
        .await
        .map_err(LoanServiceError::DirectoryError)?;

    if !user_exists {
        return Err(LoanServiceError::UserNotFound);
    }

    // 1. 在庫を予約する（最初の副作用）。
    //    通信失敗時はローカル状態が変更されていないため補償は不要。
    match deps
        .stock_client
        .try_reserve(cmd.book_id)
        .await
        .map_err(LoanServiceError::Communication)?
    {
        ReserveOutcome::Reserved => {}
        ReserveOutcome::OutOfStock => return Err(LoanServiceError::BookNotAvailable),
        ReserveOutcome::NotFound => return Err(LoanServiceError::BookNotFound),
    }

    // 2. 重複貸出の確認。ここで見つかる重複は副作用の後に発覚した
    //    障害であり、予約を補償してから拒否する。
    let existing = match deps.loan_store.find_active(cmd.user_id, cmd.book_id).await {
        Ok(existing) => existing,
        Err(e) => {
            compensate_reservation(deps, cmd.book_id, "duplicate-loan check").await?;
            return Err(LoanServiceError::StoreError(e));
        }
    };

    if existing.is_some() {
        compensate_reservation(deps, cmd.book_id, "duplicate-loan rejection").await?;
        return Err(LoanServiceError::BookAlreadyBorrowed);
    }

    // 3. 貸出を永続化する。失敗時は予約を補償してから元のエラーを返す。
    let loan = domain::loan::borrow_loan(cmd.book_id, cmd.user_id, cmd.loan_date, Utc::now());

    if let Err(e) = deps.loan_store.save(loan.clone()).await {
        compensate_reservation(deps, cmd.book_id, "loan persistence").await?;
        return Err(LoanServiceError::StoreError(e));
    }

    // 4. LoanCreatedイベントを発行。発行失敗は呼び出し側に伝播しない。
    publish_created(deps, &loan).await;

    Ok(loan)
}

/// 貸出を返却する
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 既に返却済みでないこと（リモート呼び出し前に確認する。
///   返却には補償可能なリモート前提条件がないため、borrowとは逆に
///   ローカル状態を先に検証する）
/// - 延滞中の貸出も返却可能
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 返却コマンド
///
/// # 戻り値
/// 成功時は返却済みの貸出
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<Loan> {
    // 1. 貸出をロードする
    let loan = deps
        .loan_store
        .find_by_id(cmd.loan_id)
        .await
        .map_err(LoanServiceError::StoreError)?
        .ok_or(LoanServiceError::LoanNotFound)?;

    // 2. 返却済みなら冪等に拒否する。リモート呼び出しは行わない。
    if loan.status.is_returned() {
        return Err(LoanServiceError::LoanAlreadyReturned);
    }

    // 3. 在庫を戻す。拒否された場合は貸出を変更せずBorrowedのまま残し、
    //    照合後のリトライに委ねる。通信失敗時も変更しない。
    match deps
        .stock_client
        .try_release(loan.book_id)
        .await
        .map_err(LoanServiceError::Communication)?
    {
        ReleaseOutcome::Released => {}
        outcome => {
            tracing::error!(
                loan_id = %loan.loan_id,
                book_id = %loan.book_id,
                ?outcome,
                "stock ledger rejected the release; loan ledger and stock ledger have diverged"
            );
            return Err(LoanServiceError::StockInconsistency {
                book_id: loan.book_id,
            });
        }
    }

    // 4. 返却を永続化してイベントを発行
    let returned = domain::loan::mark_returned(&loan, cmd.returned_on, Utc::now())
        .map_err(|_| LoanServiceError::LoanAlreadyReturned)?;

    deps.loan_store
        .save(returned.clone())
        .await
        .map_err(LoanServiceError::StoreError)?;

    publish_returned(deps, &returned).await;

    Ok(returned)
}
