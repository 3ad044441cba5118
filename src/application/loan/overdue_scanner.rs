use crate::domain::{self, events::*, loan::Loan};
use chrono::{NaiveDate, Utc};

use super::orchestrator::{ServiceDependencies, fetch_enrichment};

/// LoanOverdueイベントを発行する（ベストエフォート）
async fn publish_overdue(deps: &ServiceDependencies, loan: &Loan) {
    let (book_title, user_email) = match fetch_enrichment(deps, loan.user_id, loan.book_id).await {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!(loan_id = %loan.loan_id, error = %e, "skipping LoanOverdue event: enrichment failed");
            return;
        }
    };

    let event = LoanEvent::Overdue(LoanOverdue {
        loan_id: loan.loan_id,
        user_id: loan.user_id,
        book_id: loan.book_id,
        book_title,
        loan_date: loan.loan_date,
        due_date: loan.due_date,
        user_email,
    });

    if let Err(e) = deps.event_publisher.publish(&event).await {
        tracing::warn!(loan_id = %loan.loan_id, error = %e, "failed to publish LoanOverdue event");
    }
}

/// 延滞検出スキャン
///
/// 定期的に実行され、返却期限を過ぎた貸出をOverdueに遷移させて
/// LoanOverdueイベントを発行する。
///
/// ビジネスルール：
/// - due_date < today かつ status = Borrowed の貸出を延滞とする
/// - 既にOverdueの貸出はクエリから除外される（繰り返し実行は遷移に
///   ついて自然に冪等になる）。イベント発行は重複排除されない。
/// - 遷移の永続化が真実の源。通知（取得・発行）はベストエフォートで、
///   1件の失敗は残りのバッチを妨げず、遷移もロールバックしない。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `today` - スキャン実行日
///
/// # 戻り値
/// Overdueに遷移させた貸出の件数
///
/// # エラー
/// 候補クエリ自体の失敗のみ。個々の貸出の失敗はログに記録して継続する。
pub async fn run_overdue_scan(
    deps: &ServiceDependencies,
    today: NaiveDate,
) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let candidates = deps.loan_store.find_borrowed_due_before(today).await?;
    let mut transitioned = 0;

    for loan in candidates {
        // 1. 純粋関数で遷移を生成
        let overdue = match domain::loan::mark_overdue(&loan, today, Utc::now()) {
            Ok(overdue) => overdue,
            Err(e) => {
                tracing::warn!(loan_id = %loan.loan_id, ?e, "skipping overdue candidate");
                continue;
            }
        };

        // 2. 遷移を永続化。失敗はこの貸出だけを諦めて次へ進む。
        if let Err(e) = deps.loan_store.save(overdue.clone()).await {
            tracing::error!(loan_id = %loan.loan_id, error = %e, "failed to persist overdue transition");
            continue;
        }

        transitioned += 1;
        tracing::info!(loan_id = %overdue.loan_id, due_date = %overdue.due_date, "loan transitioned to overdue");

        // 3. 通知イベントを発行（ベストエフォート）
        publish_overdue(deps, &overdue).await;
    }

    Ok(transitioned)
}
