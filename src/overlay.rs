//! 状态叠加层文本
//!
//! 缺失的测量值显示为 `--`，不显示为 0。
//! 每帧的叠加层交给 [`OverlaySink`]；默认实现向标准输出写一行 JSON，
//! 日志走 stderr，两者互不干扰。

use std::io::{self, Write};

use health_signals::{Alert, BlinkOutput, PostureOutput};
use serde::Serialize;

/// 一帧的叠加层
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub ts: f64,
    pub lines: Vec<String>,
}

pub trait OverlaySink: Send {
    fn render(&mut self, overlay: &Overlay) -> io::Result<()>;

    fn name(&self) -> &'static str;
}

/// 丢弃叠加层
#[derive(Debug, Default)]
pub struct NoopOverlay;

impl OverlaySink for NoopOverlay {
    fn render(&mut self, _overlay: &Overlay) -> io::Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// 每帧一行 JSON：`{"ts":1.5,"lines":["EAR: 0.287", ...]}`
#[derive(Debug)]
pub struct JsonlOverlay<W> {
    writer: W,
}

impl<W: Write> JsonlOverlay<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonlOverlay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> OverlaySink for JsonlOverlay<W> {
    fn render(&mut self, overlay: &Overlay) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, overlay)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }
}

pub fn select_overlay(enabled: bool) -> Box<dyn OverlaySink> {
    if enabled {
        Box::new(JsonlOverlay::stdout())
    } else {
        Box::new(NoopOverlay)
    }
}

pub fn status_lines(blink: &BlinkOutput, posture: &PostureOutput, alerts: &[Alert]) -> Vec<String> {
    let mut lines = Vec::with_capacity(4 + alerts.len());
    lines.push(match blink.ear {
        Some(ear) => format!("EAR: {ear:.3}"),
        None => "EAR: --".to_string(),
    });
    lines.push(format!("Total blinks: {}", blink.total_blinks));
    lines.push(format!("Blinks last 60s: {}", blink.blinks_last_minute));
    lines.push(match posture.angle {
        Some(angle) => format!("Torso angle: {angle:.1}°"),
        None => "Torso angle: --".to_string(),
    });
    lines.extend(alerts.iter().map(|a| format!("ALERT: {a}")));
    lines
}
