//! 关键点估计能力
//!
//! 估计器是显式的能力对象，由检测器独占持有，不存在进程级单例。
//! 这里的实现读取外部估计进程写入帧记录的检测结果，并按置信度阈值筛选。

use health_signals::{EyePair, TorsoSample};
use crate::frame::{Detection, Frame};

#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// 首次检测所需的最低置信度
    pub min_detection_confidence: f64,
    /// 上一帧已检测到目标时（跟踪中）所需的最低置信度
    pub min_tracking_confidence: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err("estimator.min_detection_confidence must be in [0,1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_tracking_confidence) {
            return Err("estimator.min_tracking_confidence must be in [0,1]".to_string());
        }
        Ok(())
    }
}

/// 给定一帧，返回固定拓扑的关键点采样，未检测到目标时返回 None
pub trait LandmarkEstimator {
    type Output;

    fn estimate(&mut self, frame: &Frame) -> Option<Self::Output>;

    /// 释放底层资源。会话结束时由持有者调用恰好一次
    fn close(&mut self) {}
}

/// 检测/跟踪两级置信度门限
#[derive(Debug)]
struct ConfidenceGate {
    config: EstimatorConfig,
    tracking: bool,
}

impl ConfidenceGate {
    fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            tracking: false,
        }
    }

    fn admit<'a>(&mut self, detection: Option<&'a Detection>) -> Option<&'a Detection> {
        let threshold = if self.tracking {
            self.config.min_tracking_confidence
        } else {
            self.config.min_detection_confidence
        };
        let admitted = detection.filter(|d| d.score >= threshold);
        self.tracking = admitted.is_some();
        admitted
    }
}

/// 面部网格估计器，输出双眼 6 点采样
#[derive(Debug)]
pub struct FaceMeshEstimator {
    gate: ConfidenceGate,
    closed: bool,
}

impl FaceMeshEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            gate: ConfidenceGate::new(config),
            closed: false,
        }
    }
}

impl LandmarkEstimator for FaceMeshEstimator {
    type Output = EyePair;

    fn estimate(&mut self, frame: &Frame) -> Option<EyePair> {
        if self.closed {
            return None;
        }
        let detection = self.gate.admit(frame.face.as_ref())?;
        EyePair::from_face_mesh(&detection.landmarks)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            tracing::debug!("Face mesh estimator released");
        }
    }
}

/// 人体姿态估计器，输出肩/髋四点
#[derive(Debug)]
pub struct PoseEstimator {
    gate: ConfidenceGate,
    closed: bool,
}

impl PoseEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            gate: ConfidenceGate::new(config),
            closed: false,
        }
    }
}

impl LandmarkEstimator for PoseEstimator {
    type Output = TorsoSample;

    fn estimate(&mut self, frame: &Frame) -> Option<TorsoSample> {
        if self.closed {
            return None;
        }
        let detection = self.gate.admit(frame.pose.as_ref())?;
        TorsoSample::from_pose(&detection.landmarks)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            tracing::debug!("Pose estimator released");
        }
    }
}
