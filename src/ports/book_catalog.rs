use crate::domain::value_objects::BookId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍カタログポート
///
/// 貸出コンテキストと在庫サービスのカタログ側の境界を維持する。
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// 書籍タイトルを取得する
    ///
    /// 通知イベントの非正規化フィールドとして発行時に取得される。
    async fn get_title(&self, book_id: BookId) -> Result<String>;
}
