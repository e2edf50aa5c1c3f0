// テストユーティリティとモック実装
// 統合テストで共有するソースの組み立てと検証用の出力シンク

pub mod mocks;
pub mod test_data;

// 公開API
pub use mocks::*;
pub use test_data::*;
