use crate::domain::events::*;
use chrono::{Duration, NaiveDate};

use super::orchestrator::{ServiceDependencies, fetch_enrichment};

/// リマインダーを送る返却期限までの日数
pub const REMINDER_LEAD_DAYS: i64 = 2;

/// 返却期限リマインダースキャン
///
/// 定期的に実行され、返却期限がREMINDER_LEAD_DAYS日後に迫った
/// 貸出中の貸出についてLoanReminderイベントを発行する。
///
/// ビジネスルール：
/// - due_date = today + REMINDER_LEAD_DAYS かつ status = Borrowed が対象
/// - ステータス遷移は行わない
/// - 1件の失敗（取得・発行）はログに記録し、残りのバッチを妨げない
/// - 繰り返し実行をまたいだイベントの重複排除は行わない
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `today` - スキャン実行日
///
/// # 戻り値
/// 発行したリマインダーイベントの件数
///
/// # エラー
/// 候補クエリ自体の失敗のみ。
pub async fn run_reminder_scan(
    deps: &ServiceDependencies,
    today: NaiveDate,
) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let due_on = today + Duration::days(REMINDER_LEAD_DAYS);
    let candidates = deps.loan_store.find_borrowed_due_on(due_on).await?;
    let mut emitted = 0;

    for loan in candidates {
        let (book_title, user_email) =
            match fetch_enrichment(deps, loan.user_id, loan.book_id).await {
                Ok(fields) => fields,
                Err(e) => {
                    tracing::warn!(loan_id = %loan.loan_id, error = %e, "skipping LoanReminder event: enrichment failed");
                    continue;
                }
            };

        let event = LoanEvent::Reminder(LoanReminder {
            loan_id: loan.loan_id,
            user_id: loan.user_id,
            book_id: loan.book_id,
            book_title,
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            user_email,
        });

        match deps.event_publisher.publish(&event).await {
            Ok(()) => emitted += 1,
            Err(e) => {
                tracing::warn!(loan_id = %loan.loan_id, error = %e, "failed to publish LoanReminder event");
            }
        }
    }

    Ok(emitted)
}
