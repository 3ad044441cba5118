/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 既に返却済み
    AlreadyReturned,
}

/// 延滞遷移のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOverdueError {
    /// 貸出中（Borrowed）以外からは延滞に遷移できない
    NotBorrowed,
    /// 返却期限をまだ過ぎていない
    NotPastDue,
}
