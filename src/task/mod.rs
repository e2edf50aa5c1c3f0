// タスク層 - 継続渡しスタイルのスケジューリング基盤
//
// group   - ワーカープール上のタスク群と完了待機
// holder  - 参照カウントによるfan-out/join
// funnel  - 並行投入・直列実行のキュー

pub mod funnel;
pub mod group;
pub mod holder;

// 公開API
pub use funnel::CollateFunnel;
pub use group::TaskGroup;
pub use holder::{OptionalTaskHolder, TaskHolder};
