//! 追加写入的 CSV 健康日志
//!
//! 文件首次创建时写一次表头；之后每个日志周期追加一行。缺失的测量值写为空单元格。

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::LogRecord;

pub const HEADER: &str = "timestamp,ear,total_blinks,blinks_last_min,posture_angle,alert";

#[derive(Debug, Error)]
pub enum CsvLogError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CsvLogger {
    path: PathBuf,
}

impl CsvLogger {
    /// 打开（必要时创建）日志文件。父目录不存在时一并创建
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CsvLogError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source: std::io::Error| CsvLogError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(io_err)?;
        let len = file.metadata().await.map_err(io_err)?.len();
        if len == 0 {
            file.write_all(format!("{HEADER}\n").as_bytes())
                .await
                .map_err(io_err)?;
            file.flush().await.map_err(io_err)?;
            tracing::info!(path = %path.display(), "Created health log");
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: &LogRecord) -> Result<(), CsvLogError> {
        let io_err = |source: std::io::Error| CsvLogError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        file.write_all(format_row(record).as_bytes())
            .await
            .map_err(io_err)?;
        file.flush().await.map_err(io_err)
    }
}

pub fn format_row(record: &LogRecord) -> String {
    let fields = [
        record.timestamp.to_rfc3339(),
        record.ear.map(|v| v.to_string()).unwrap_or_default(),
        record.total_blinks.to_string(),
        record.blinks_last_min.to_string(),
        record.posture_angle.map(|v| v.to_string()).unwrap_or_default(),
        record.alert.clone().unwrap_or_default(),
    ];
    let mut row = fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(ear: Option<f64>, angle: Option<f64>, alert: Option<&str>) -> LogRecord {
        LogRecord {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap(),
            ear,
            total_blinks: 12,
            blinks_last_min: 7,
            posture_angle: angle,
            alert: alert.map(str::to_string),
        }
    }

    #[test]
    fn absent_values_are_empty_cells() {
        let row = format_row(&record(None, None, None));
        assert_eq!(row, "2026-03-01T08:30:00+00:00,,12,7,,\n");
    }

    #[test]
    fn present_values_are_written() {
        let row = format_row(&record(Some(0.25), Some(17.5), Some("Bad posture: tilt 17.5°")));
        assert_eq!(
            row,
            "2026-03-01T08:30:00+00:00,0.25,12,7,17.5,Bad posture: tilt 17.5°\n"
        );
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("plain; text"), "plain; text");
    }

    #[tokio::test]
    async fn header_written_once_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("health_log.csv");

        let logger = CsvLogger::open(&path).await.unwrap();
        logger.append(&record(Some(0.3), None, None)).await.unwrap();
        drop(logger);

        let logger = CsvLogger::open(&path).await.unwrap();
        logger.append(&record(None, Some(4.0), None)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(content.matches("timestamp,").count(), 1);
    }

    #[tokio::test]
    async fn append_to_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health_log.csv");
        let logger = CsvLogger::open(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(logger.append(&record(None, None, None)).await.is_err());
    }
}
