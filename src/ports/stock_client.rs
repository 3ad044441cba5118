use crate::domain::value_objects::BookId;
use async_trait::async_trait;
use thiserror::Error;

/// 予約呼び出しのドメイン上の結果
///
/// 在庫サービスが返すビジネス上の判断。トランスポート層の失敗とは
/// 区別され、後者は`CommunicationFailure`として表現される。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// 1冊確保された
    Reserved,
    /// 貸出可能な在庫がない
    OutOfStock,
    /// 書籍が存在しない
    NotFound,
}

/// 返却（在庫戻し）呼び出しのドメイン上の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// 1冊在庫に戻された
    Released,
    /// 在庫数が既に総冊数に達している（在庫台帳の不整合を示す）
    AtFullQuantity,
    /// 書籍が存在しない
    NotFound,
}

/// 在庫サービスとの通信失敗
///
/// タイムアウト・接続失敗・想定外のHTTPステータスなど、
/// ビジネス上の拒否ではない失敗。呼び出し側でリトライ可能。
#[derive(Debug, Clone, Error)]
#[error("stock service communication failure: {reason}")]
pub struct CommunicationFailure {
    pub reason: String,
}

impl CommunicationFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// 在庫サービスポート
///
/// 書籍ごとの在庫カウンタを所有する在庫サービスとの境界。
/// カウンタの変更はこのポート経由でのみ行われ、書籍ごとの直列化は
/// 在庫サービス側の責務。
///
/// このレイヤーではリトライしない。リトライの判断はサガの状態を
/// 知っているオーケストレータに属する。
#[async_trait]
pub trait StockClient: Send + Sync {
    /// 1冊の予約を試みる
    async fn try_reserve(&self, book_id: BookId) -> Result<ReserveOutcome, CommunicationFailure>;

    /// 1冊の在庫戻しを試みる
    async fn try_release(&self, book_id: BookId) -> Result<ReleaseOutcome, CommunicationFailure>;
}
