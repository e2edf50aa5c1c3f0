// レーン層 - イベント番号の取得と処理ループ
//
// counter    - 全レーン共有のイベント番号カウンタ
// waiter     - プロダクトごとの擬似遅延
// scheduler  - レーンの自己供給ループとfan-out/join

pub mod counter;
pub mod scheduler;
pub mod waiter;

// 公開API
pub use counter::EventCounter;
pub use scheduler::{Lane, LaneContext};
pub use waiter::Waiter;
