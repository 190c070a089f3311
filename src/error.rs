use thiserror::Error;

use crate::sinks::csv_log::CsvLogError;

/// 会话级致命错误：只在启动阶段出现，出现即终止会话
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to initialize logging: {0}")]
    Logging(String),
    #[error("failed to open frame source {path}: {source}")]
    FrameSource {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open csv log: {0}")]
    CsvLog(#[from] CsvLogError),
}
