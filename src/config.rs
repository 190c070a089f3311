use std::env;
use std::fmt;
use std::str::FromStr;

use health_signals::{BlinkConfig, PostureConfig};

use crate::estimator::EstimatorConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    /// 帧来源：`-` 表示标准输入，否则为 JSONL 文件路径
    pub frame_source: String,
    pub csv_log_path: String,
    pub log_interval_secs: f64,
    pub blink: BlinkConfig,
    pub posture: PostureConfig,
    pub estimator: EstimatorConfig,
    pub notifications_enabled: bool,
    /// 是否向标准输出写每帧叠加层（JSONL）
    pub overlay_enabled: bool,
    pub telemetry: TelemetryConfig,
}

#[derive(Clone)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub url: String,
    pub auth_token: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for TelemetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryConfig")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("auth_token", &"***REDACTED***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            auth_token: String::new(),
            timeout_secs: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let blink_defaults = BlinkConfig::default();
        let posture_defaults = PostureConfig::default();
        let estimator_defaults = EstimatorConfig::default();

        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            frame_source: env_or("FRAME_SOURCE", "-"),
            csv_log_path: env_or("CSV_LOG_PATH", "logs/health_log.csv"),
            log_interval_secs: env_or_parse("LOG_INTERVAL_SECS", 5.0_f64),
            blink: BlinkConfig {
                ear_threshold: env_or_parse("EAR_THRESHOLD", blink_defaults.ear_threshold),
                consec_frames: env_or_parse("CONSEC_FRAMES", blink_defaults.consec_frames),
                drowsy_secs: env_or_parse("DROWSY_SECS", blink_defaults.drowsy_secs),
                window_secs: env_or_parse("BLINK_WINDOW_SECS", blink_defaults.window_secs),
            },
            posture: PostureConfig {
                slouch_threshold_deg: env_or_parse(
                    "SLOUCH_THRESHOLD_DEG",
                    posture_defaults.slouch_threshold_deg,
                ),
            },
            estimator: EstimatorConfig {
                min_detection_confidence: env_or_parse(
                    "MIN_DETECTION_CONFIDENCE",
                    estimator_defaults.min_detection_confidence,
                ),
                min_tracking_confidence: env_or_parse(
                    "MIN_TRACKING_CONFIDENCE",
                    estimator_defaults.min_tracking_confidence,
                ),
            },
            notifications_enabled: env_or_bool("NOTIFICATIONS_ENABLED", true),
            overlay_enabled: env_or_bool("OVERLAY_ENABLED", true),
            telemetry: TelemetryConfig {
                enabled: env_or_bool("TELEMETRY_ENABLED", false),
                url: env_or("TELEMETRY_URL", ""),
                auth_token: env_or("TELEMETRY_AUTH_TOKEN", ""),
                timeout_secs: env_or_parse("TELEMETRY_TIMEOUT_SECS", 5_u64),
            },
        }
    }

    /// 启动前校验；任何一项不合法都视为致命错误
    pub fn validate(&self) -> Result<(), String> {
        self.blink.validate()?;
        self.posture.validate()?;
        self.estimator.validate()?;
        if !(self.log_interval_secs > 0.0 && self.log_interval_secs.is_finite()) {
            return Err("log_interval_secs must be > 0".to_string());
        }
        if self.csv_log_path.trim().is_empty() {
            return Err("csv_log_path must not be empty".to_string());
        }
        if self.frame_source.trim().is_empty() {
            return Err("frame_source must not be empty".to_string());
        }
        Ok(())
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "RUST_LOG",
            "FRAME_SOURCE",
            "EAR_THRESHOLD",
            "CONSEC_FRAMES",
            "SLOUCH_THRESHOLD_DEG",
            "LOG_INTERVAL_SECS",
            "TELEMETRY_ENABLED",
            "TELEMETRY_AUTH_TOKEN",
            "NOTIFICATIONS_ENABLED",
            "OVERLAY_ENABLED",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.frame_source, "-");
        assert_eq!(cfg.blink.ear_threshold, 0.24);
        assert_eq!(cfg.blink.consec_frames, 3);
        assert_eq!(cfg.blink.drowsy_secs, 2.0);
        assert_eq!(cfg.blink.window_secs, 60.0);
        assert_eq!(cfg.posture.slouch_threshold_deg, 15.0);
        assert_eq!(cfg.log_interval_secs, 5.0);
        assert!(!cfg.telemetry.enabled);
        assert!(cfg.overlay_enabled);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_numeric_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("EAR_THRESHOLD", "0.2");
        env::set_var("CONSEC_FRAMES", "5");
        env::set_var("SLOUCH_THRESHOLD_DEG", "22.5");

        let cfg = Config::from_env();
        assert_eq!(cfg.blink.ear_threshold, 0.2);
        assert_eq!(cfg.blink.consec_frames, 5);
        assert_eq!(cfg.posture.slouch_threshold_deg, 22.5);
        clear_keys(managed_keys());
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("CONSEC_FRAMES", "three");
        env::set_var("NOTIFICATIONS_ENABLED", "maybe");

        let cfg = Config::from_env();
        assert_eq!(cfg.blink.consec_frames, 3);
        assert!(cfg.notifications_enabled);
        clear_keys(managed_keys());
    }

    #[test]
    fn validation_rejects_bad_interval() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("LOG_INTERVAL_SECS", "0");
        let cfg = Config::from_env();
        assert!(cfg.validate().is_err());
        clear_keys(managed_keys());
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = TelemetryConfig {
            auth_token: "secret-token".to_string(),
            ..TelemetryConfig::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("REDACTED"));
    }
}
