//! 眨眼/困倦检测引擎
//!
//! 基于连续闭眼帧计数进行去抖：
//! EAR 低于阈值的帧累计到 `consec_frames` 以上、随后睁眼，才记为一次眨眼。
//! 不足 `consec_frames` 的闭眼序列视为噪声，直接丢弃。
//!
//! 同时维护最近 `window_secs` 秒内的眨眼时间戳队列。队列只在新眨眼到来时裁剪，
//! 因此无眨眼期间 `blinks_last_minute` 保持上一次眨眼时的值。
//!
//! 闭眼持续超过 `drowsy_secs` 时输出困倦告警，告警不重置任何计数。

use std::collections::VecDeque;

use crate::alert::Alert;
use crate::ear::binocular_ear;
use crate::landmarks::EyePair;

#[derive(Debug, Clone)]
pub struct BlinkConfig {
    /// EAR 阈值，低于此值视为闭眼
    pub ear_threshold: f64,
    /// 记为一次眨眼所需的最少连续闭眼帧数
    pub consec_frames: u32,
    /// 困倦判定的闭眼时长（秒）
    pub drowsy_secs: f64,
    /// 眨眼滚动窗口（秒）
    pub window_secs: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.24,
            consec_frames: 3,
            drowsy_secs: 2.0,
            window_secs: 60.0,
        }
    }
}

impl BlinkConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.ear_threshold > 0.0 && self.ear_threshold.is_finite()) {
            return Err("blink.ear_threshold must be > 0".to_string());
        }
        if self.consec_frames == 0 {
            return Err("blink.consec_frames must be >= 1".to_string());
        }
        if !(self.drowsy_secs > 0.0 && self.drowsy_secs.is_finite()) {
            return Err("blink.drowsy_secs must be > 0".to_string());
        }
        if !(self.window_secs > 0.0 && self.window_secs.is_finite()) {
            return Err("blink.window_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// 单帧处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct BlinkOutput {
    /// 本帧双眼平均 EAR；未检测到面部时为 None
    pub ear: Option<f64>,
    pub total_blinks: u64,
    pub blinks_last_minute: usize,
    pub alert: Option<Alert>,
}

#[derive(Debug)]
pub struct BlinkEngine {
    config: BlinkConfig,
    closed_frames: u32,
    total_blinks: u64,
    closed_since: Option<f64>,
    blink_times: VecDeque<f64>,
}

impl BlinkEngine {
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            config,
            closed_frames: 0,
            total_blinks: 0,
            closed_since: None,
            blink_times: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &BlinkConfig {
        &self.config
    }

    /// 处理一帧
    ///
    /// `eyes` 为 None 表示本帧无检测结果：状态保持不变，EAR 与告警均为 None。
    /// `now` 为单调递增的秒级时间戳。
    pub fn process(
        &mut self,
        eyes: Option<&EyePair>,
        width: u32,
        height: u32,
        now: f64,
    ) -> BlinkOutput {
        let Some(eyes) = eyes else {
            return self.snapshot(None, None);
        };

        let ear = binocular_ear(eyes, f64::from(width), f64::from(height));
        self.update(ear, now);

        let alert = self
            .closed_since
            .filter(|start| now - start > self.config.drowsy_secs)
            .map(|_| Alert::Drowsiness {
                threshold_secs: self.config.drowsy_secs,
            });

        self.snapshot(Some(ear), alert)
    }

    fn update(&mut self, ear: f64, now: f64) {
        if ear < self.config.ear_threshold {
            self.closed_frames += 1;
            if self.closed_since.is_none() {
                self.closed_since = Some(now);
            }
            return;
        }

        if self.closed_frames >= self.config.consec_frames {
            self.register_blink(now);
        }
        self.closed_frames = 0;
        self.closed_since = None;
    }

    fn register_blink(&mut self, now: f64) {
        self.total_blinks += 1;
        self.blink_times.push_back(now);
        while let Some(&front) = self.blink_times.front() {
            if now - front > self.config.window_secs {
                self.blink_times.pop_front();
            } else {
                break;
            }
        }
    }

    fn snapshot(&self, ear: Option<f64>, alert: Option<Alert>) -> BlinkOutput {
        BlinkOutput {
            ear,
            total_blinks: self.total_blinks,
            blinks_last_minute: self.blink_times.len(),
            alert,
        }
    }

    pub fn total_blinks(&self) -> u64 {
        self.total_blinks
    }

    /// 当前连续闭眼帧数
    pub fn closed_frames(&self) -> u32 {
        self.closed_frames
    }

    /// 窗口内（截至最近一次眨眼）的眨眼时间戳
    pub fn window(&self) -> impl Iterator<Item = f64> + '_ {
        self.blink_times.iter().copied()
    }

    pub fn reset(&mut self) {
        self.closed_frames = 0;
        self.total_blinks = 0;
        self.closed_since = None;
        self.blink_times.clear();
    }
}

impl Default for BlinkEngine {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}
