//! 会话输出端：本地 CSV、远程遥测、桌面通知
//!
//! 只有 CSV 日志在启动时是必需的；遥测与通知均为尽力而为，失败只记录告警。

pub mod csv_log;
pub mod notify;
pub mod telemetry;

use chrono::{DateTime, Utc};
use health_signals::{Alert, BlinkOutput, PostureOutput};
use serde::Serialize;

/// 每个日志周期一条记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub ear: Option<f64>,
    pub total_blinks: u64,
    pub blinks_last_min: usize,
    pub posture_angle: Option<f64>,
    /// 多条告警以 `"; "` 连接；无告警时为 None
    pub alert: Option<String>,
}

impl LogRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        blink: &BlinkOutput,
        posture: &PostureOutput,
        alerts: &[Alert],
    ) -> Self {
        let alert = (!alerts.is_empty()).then(|| {
            alerts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        });
        Self {
            timestamp,
            ear: blink.ear,
            total_blinks: blink.total_blinks,
            blinks_last_min: blink.blinks_last_minute,
            posture_angle: posture.angle,
            alert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_are_semicolon_joined() {
        let blink = BlinkOutput {
            ear: Some(0.1),
            total_blinks: 4,
            blinks_last_minute: 2,
            alert: None,
        };
        let posture = PostureOutput {
            angle: Some(21.0),
            alert: None,
        };
        let alerts = [
            Alert::Drowsiness {
                threshold_secs: 2.0,
            },
            Alert::Slouch { angle_deg: 21.0 },
        ];
        let record = LogRecord::new(Utc::now(), &blink, &posture, &alerts);
        assert_eq!(
            record.alert.as_deref(),
            Some("Eyes closed > 2s - possible drowsiness; Bad posture: tilt 21.0°")
        );
        assert_eq!(record.blinks_last_min, 2);
    }

    #[test]
    fn no_alerts_is_none() {
        let blink = BlinkOutput {
            ear: None,
            total_blinks: 0,
            blinks_last_minute: 0,
            alert: None,
        };
        let posture = PostureOutput {
            angle: None,
            alert: None,
        };
        let record = LogRecord::new(Utc::now(), &blink, &posture, &[]);
        assert_eq!(record.alert, None);
        assert_eq!(record.ear, None);
    }
}
