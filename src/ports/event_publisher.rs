use crate::domain::events::LoanEvent;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// イベント発行ポート
///
/// 貸出イベントをloan_idをキーとして追記専用のイベントシンクへ
/// at-least-onceで配信する。実装はトランスポートエラーを内部で
/// バックオフ付きリトライし、恒久的な失敗はログに記録する。
///
/// 呼び出し側（オーケストレータ・スキャナ）は既にコミット済みの
/// 状態変更に対して発行をfire-and-forgetとして扱う。
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// イベントを直列化してシンクに追記する
    async fn publish(&self, event: &LoanEvent) -> Result<()>;
}
