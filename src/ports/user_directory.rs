use crate::domain::value_objects::UserId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者ディレクトリポート
///
/// 貸出コンテキストと利用者管理サービスの境界を維持する。
/// 貸出コンテキストはUserIDのみを知り、利用者詳細は知らない。
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 利用者が存在するか確認する
    ///
    /// 貸出作成前の利用者バリデーションに使用される。
    async fn exists(&self, user_id: UserId) -> Result<bool>;

    /// 利用者のメールアドレスを取得する
    ///
    /// 通知イベントの非正規化フィールドとして発行時に取得される。
    async fn get_email(&self, user_id: UserId) -> Result<String>;
}
