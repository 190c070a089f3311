//! 躯干姿态检测
//!
//! 取肩部中点与髋部中点构成躯干向量（髋 → 肩），计算其与竖直向上方向的夹角。
//! 图像坐标 y 轴向下，所以"向上"是 (0, -1)。
//!
//! 与眨眼引擎不同，这里没有跨帧记忆：每帧独立判定，单帧超阈值即告警。

use crate::alert::Alert;
use crate::geometry::{angle_between, midpoint, Point};
use crate::landmarks::TorsoSample;

const UPRIGHT: Point = Point::new(0.0, -1.0);

#[derive(Debug, Clone)]
pub struct PostureConfig {
    /// 驼背判定角度（度）
    pub slouch_threshold_deg: f64,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            slouch_threshold_deg: 15.0,
        }
    }
}

impl PostureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=180.0).contains(&self.slouch_threshold_deg) {
            return Err("posture.slouch_threshold_deg must be in [0,180]".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostureOutput {
    /// 躯干倾斜角（度）；未检测到人体时为 None
    pub angle: Option<f64>,
    pub alert: Option<Alert>,
}

#[derive(Debug, Default)]
pub struct PostureEngine {
    config: PostureConfig,
}

impl PostureEngine {
    pub fn new(config: PostureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PostureConfig {
        &self.config
    }

    pub fn process(&self, torso: Option<&TorsoSample>) -> PostureOutput {
        let Some(torso) = torso else {
            return PostureOutput {
                angle: None,
                alert: None,
            };
        };

        let angle = torso_angle(torso);
        let alert = (angle > self.config.slouch_threshold_deg)
            .then_some(Alert::Slouch { angle_deg: angle });
        PostureOutput {
            angle: Some(angle),
            alert,
        }
    }
}

/// 躯干与竖直方向夹角（度），使用归一化坐标
pub fn torso_angle(torso: &TorsoSample) -> f64 {
    let shoulders = midpoint(torso.shoulder_left, torso.shoulder_right);
    let hips = midpoint(torso.hip_left, torso.hip_right);
    angle_between(shoulders - hips, UPRIGHT)
}
