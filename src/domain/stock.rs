use serde::{Deserialize, Serialize};

/// 予約のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveError {
    /// 貸出可能な在庫がない
    OutOfStock,
}

/// 返却（在庫戻し）のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseError {
    /// 在庫数が既に総冊数に達している
    AtFullQuantity,
}

/// 在庫カウンタ - 書籍1冊あたりの貸出可能数
///
/// 不変条件：0 <= available <= quantity
/// reserve / release は available をちょうど1ずつ増減させ、
/// 不変条件を破る操作は拒否される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCounter {
    quantity: u32,
    available: u32,
}

impl StockCounter {
    /// 新規作成（全冊貸出可能）
    pub fn new(quantity: u32) -> Self {
        Self {
            quantity,
            available: quantity,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    /// 純粋関数：1冊予約する
    ///
    /// 副作用なし。新しいカウンタを返す。
    ///
    /// # エラー
    /// 貸出可能数が0の場合は`ReserveError::OutOfStock`を返す
    pub fn reserve(self) -> Result<Self, ReserveError> {
        if self.available == 0 {
            return Err(ReserveError::OutOfStock);
        }
        Ok(Self {
            available: self.available - 1,
            ..self
        })
    }

    /// 純粋関数：1冊在庫に戻す
    ///
    /// 副作用なし。新しいカウンタを返す。
    ///
    /// # エラー
    /// 貸出可能数が既に総冊数に達している場合は`ReleaseError::AtFullQuantity`を返す
    pub fn release(self) -> Result<Self, ReleaseError> {
        if self.available >= self.quantity {
            return Err(ReleaseError::AtFullQuantity);
        }
        Ok(Self {
            available: self.available + 1,
            ..self
        })
    }
}
