//! 告警通知
//!
//! 通知是可选能力：构造时选定具体实现，不可用时退化为空实现，
//! 调用点无需再判断能力是否存在。

use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to spawn notifier: {0}")]
    Spawn(#[from] std::io::Error),
}

pub trait Notifier: Send {
    fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;

    fn name(&self) -> &'static str;
}

/// 不发送任何通知
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// 通过 `notify-send` 发送桌面通知（freedesktop）
#[derive(Debug)]
pub struct DesktopNotifier {
    program: PathBuf,
    timeout_ms: u32,
}

impl DesktopNotifier {
    pub const PROGRAM: &'static str = "notify-send";

    /// 在 PATH 中查找 `notify-send`，找不到返回 None
    pub fn detect() -> Option<Self> {
        let program = which::which(Self::PROGRAM).ok()?;
        Some(Self {
            program,
            timeout_ms: 3000,
        })
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        // 不等待子进程结束，避免阻塞帧循环
        Command::new(&self.program)
            .arg("--expire-time")
            .arg(self.timeout_ms.to_string())
            .arg(title)
            .arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "desktop"
    }
}

/// 按配置与运行环境选择通知实现
pub fn select_notifier(enabled: bool) -> Box<dyn Notifier> {
    if !enabled {
        return Box::new(NoopNotifier);
    }
    match DesktopNotifier::detect() {
        Some(notifier) => Box::new(notifier),
        None => {
            tracing::info!(
                program = DesktopNotifier::PROGRAM,
                "Desktop notifier not found, notifications disabled"
            );
            Box::new(NoopNotifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_selects_noop() {
        let notifier = select_notifier(false);
        assert_eq!(notifier.name(), "noop");
        assert!(notifier.notify("Blink Alert", "test").is_ok());
    }

    #[test]
    fn detected_notifier_points_at_notify_send() {
        match DesktopNotifier::detect() {
            Some(notifier) => {
                assert!(notifier.program.ends_with(DesktopNotifier::PROGRAM));
                assert_eq!(notifier.name(), "desktop");
            }
            None => assert!(which::which(DesktopNotifier::PROGRAM).is_err()),
        }
    }
}
