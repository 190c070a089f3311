//! 关键点拓扑
//!
//! 面部网格（468/478 点）与人体姿态（33 点）的固定索引。替换估计器时必须保持
//! 同样的索引语义。

use crate::geometry::Point;

/// 左眼 6 点：外眼角、上眼睑×2、内眼角、下眼睑×2，对应 EAR 公式 p1..p6
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
/// 右眼 6 点，顺序同 `LEFT_EYE`
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;

/// 单眼 6 个有序关键点（归一化坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeSample(pub [Point; 6]);

impl EyeSample {
    /// 按索引从完整拓扑中取点，任一索引越界返回 None
    pub fn from_topology(landmarks: &[Point], indices: &[usize; 6]) -> Option<Self> {
        let mut points = [Point::default(); 6];
        for (slot, &idx) in points.iter_mut().zip(indices) {
            *slot = *landmarks.get(idx)?;
        }
        Some(Self(points))
    }
}

/// 双眼采样
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePair {
    pub left: EyeSample,
    pub right: EyeSample,
}

impl EyePair {
    pub fn from_face_mesh(landmarks: &[Point]) -> Option<Self> {
        Some(Self {
            left: EyeSample::from_topology(landmarks, &LEFT_EYE)?,
            right: EyeSample::from_topology(landmarks, &RIGHT_EYE)?,
        })
    }
}

/// 躯干四点：左右肩、左右髋
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorsoSample {
    pub shoulder_left: Point,
    pub shoulder_right: Point,
    pub hip_left: Point,
    pub hip_right: Point,
}

impl TorsoSample {
    pub fn from_pose(landmarks: &[Point]) -> Option<Self> {
        Some(Self {
            shoulder_left: *landmarks.get(LEFT_SHOULDER)?,
            shoulder_right: *landmarks.get(RIGHT_SHOULDER)?,
            hip_left: *landmarks.get(LEFT_HIP)?,
            hip_right: *landmarks.get(RIGHT_HIP)?,
        })
    }
}
