use std::fmt;

/// 引擎输出的告警。`Display` 即对外展示/记录的告警文本
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    /// 持续闭眼超过阈值（秒）
    Drowsiness { threshold_secs: f64 },
    /// 躯干倾斜角（度）超过阈值
    Slouch { angle_deg: f64 },
}

impl Alert {
    /// 通知标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Drowsiness { .. } => "Blink Alert",
            Self::Slouch { .. } => "Posture Alert",
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drowsiness { threshold_secs } => {
                write!(f, "Eyes closed > {threshold_secs}s - possible drowsiness")
            }
            Self::Slouch { angle_deg } => write!(f, "Bad posture: tilt {angle_deg:.1}°"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slouch_text_has_one_decimal() {
        let alert = Alert::Slouch { angle_deg: 20.04 };
        assert_eq!(alert.to_string(), "Bad posture: tilt 20.0°");
    }

    #[test]
    fn drowsiness_text_names_threshold() {
        let alert = Alert::Drowsiness { threshold_secs: 2.0 };
        assert_eq!(alert.to_string(), "Eyes closed > 2s - possible drowsiness");
        assert_eq!(alert.title(), "Blink Alert");
    }
}
