//! 健康信号处理库
//!
//! 把关键点估计器输出的逐帧归一化坐标转换为稳定、去抖的事件：
//! 眨眼/困倦状态机与躯干倾斜姿态判定。
//!
//! ## 模块
//! - `geometry`: 距离、夹角、中点等纯函数
//! - `landmarks`: 关键点拓扑索引与眼部/躯干采样
//! - `ear`: EAR (Eye Aspect Ratio) 眼部纵横比计算
//! - `blink`: 眨眼计数与困倦检测引擎
//! - `posture`: 躯干倾斜（驼背）检测引擎
//! - `alert`: 告警类型

pub mod alert;
pub mod blink;
pub mod ear;
pub mod geometry;
pub mod landmarks;
pub mod posture;

// 重新导出核心类型，方便外部使用
pub use alert::Alert;
pub use blink::{BlinkConfig, BlinkEngine, BlinkOutput};
pub use geometry::Point;
pub use landmarks::{EyePair, EyeSample, TorsoSample};
pub use posture::{PostureConfig, PostureEngine, PostureOutput};
