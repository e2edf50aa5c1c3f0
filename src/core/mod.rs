// コアレイヤー - エラー定義と共有データ型
// 他のレイヤーから参照される基本的な型を提供

pub mod error;
pub mod types;

// 公開API - 明示的にエクスポートして曖昧性を回避
pub use error::{PipelineError, PipelineResult};
pub use types::{EventIdentifier, LaneIndex, ProcessingSummary};
