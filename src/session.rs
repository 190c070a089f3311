//! 帧编排
//!
//! 单一帧循环：一帧完整处理完（估计 → 两个引擎 → 告警/叠加层/日志）才读取下一帧。
//! 遥测推送作为独立任务运行，不阻塞帧循环，也不阻塞本地 CSV 写入。

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use health_signals::{Alert, EyePair, TorsoSample};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::Config;
use crate::detectors::{BlinkDetector, PostureDetector};
use crate::estimator::{FaceMeshEstimator, LandmarkEstimator, PoseEstimator};
use crate::frame::{Frame, JsonlFrameSource, LineSource};
use crate::overlay::{status_lines, NoopOverlay, Overlay, OverlaySink};
use crate::sinks::csv_log::CsvLogger;
use crate::sinks::notify::Notifier;
use crate::sinks::telemetry::{TelemetryClient, TelemetryOutcome};
use crate::sinks::LogRecord;

/// 关闭时等待在途遥测的最长时间
#[cfg(test)]
const TELEMETRY_DRAIN_TIMEOUT: Duration = Duration::from_millis(100);
#[cfg(not(test))]
const TELEMETRY_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Sinks {
    pub csv: CsvLogger,
    pub telemetry: TelemetryClient,
    pub notifier: Box<dyn Notifier>,
    pub overlay: Box<dyn OverlaySink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub frames: u64,
    pub total_blinks: u64,
    pub records_written: u64,
}

pub struct Session<F, P>
where
    F: LandmarkEstimator<Output = EyePair>,
    P: LandmarkEstimator<Output = TorsoSample>,
{
    id: Uuid,
    blink: BlinkDetector<F>,
    posture: PostureDetector<P>,
    sinks: Sinks,
    log_interval_secs: f64,
    last_log_ts: Option<f64>,
    telemetry_tasks: JoinSet<TelemetryOutcome>,
    summary: SessionSummary,
}

impl Session<FaceMeshEstimator, PoseEstimator> {
    pub fn from_config(id: Uuid, config: &Config, sinks: Sinks) -> Self {
        let blink = BlinkDetector::new(
            FaceMeshEstimator::new(config.estimator.clone()),
            config.blink.clone(),
        );
        let posture = PostureDetector::new(
            PoseEstimator::new(config.estimator.clone()),
            config.posture.clone(),
        );
        Self::new(id, blink, posture, sinks, config.log_interval_secs)
    }
}

impl<F, P> Session<F, P>
where
    F: LandmarkEstimator<Output = EyePair>,
    P: LandmarkEstimator<Output = TorsoSample>,
{
    pub fn new(
        id: Uuid,
        blink: BlinkDetector<F>,
        posture: PostureDetector<P>,
        sinks: Sinks,
        log_interval_secs: f64,
    ) -> Self {
        Self {
            id,
            blink,
            posture,
            sinks,
            log_interval_secs,
            last_log_ts: None,
            telemetry_tasks: JoinSet::new(),
            summary: SessionSummary::default(),
        }
    }

    /// 运行到帧流结束或收到 `shutdown`，随后释放估计器并等待在途遥测
    #[tracing::instrument(name = "session", skip_all, fields(session_id = %self.id))]
    pub async fn run<L, S>(
        mut self,
        source: &mut JsonlFrameSource<L>,
        shutdown: S,
    ) -> SessionSummary
    where
        L: LineSource,
        S: Future<Output = ()>,
    {
        tracing::info!(
            notifier = self.sinks.notifier.name(),
            overlay = self.sinks.overlay.name(),
            telemetry = self.sinks.telemetry.is_enabled(),
            csv = %self.sinks.csv.path().display(),
            "Session started"
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                frame = source.next_frame() => match frame {
                    Some(frame) => self.handle_frame(&frame).await,
                    None => {
                        tracing::info!("Frame stream ended");
                        break;
                    }
                },
            }
        }

        self.finish().await
    }

    async fn handle_frame(&mut self, frame: &Frame) {
        self.summary.frames += 1;

        let blink = self.blink.process(frame);
        let posture = self.posture.process(frame);

        let alerts: Vec<Alert> = blink.alert.into_iter().chain(posture.alert).collect();
        for alert in &alerts {
            let message = alert.to_string();
            if let Err(e) = self.sinks.notifier.notify(alert.title(), &message) {
                tracing::warn!(error = %e, alert = %message, "Failed to send notification");
            }
        }

        let overlay = Overlay {
            ts: frame.ts,
            lines: status_lines(&blink, &posture, &alerts),
        };
        if let Err(e) = self.sinks.overlay.render(&overlay) {
            // 输出端已断开（如管道被关闭），此后不再尝试
            tracing::warn!(error = %e, "Overlay output failed, disabling overlay");
            self.sinks.overlay = Box::new(NoopOverlay);
        }

        if self.log_due(frame.ts) {
            self.last_log_ts = Some(frame.ts);
            let record = LogRecord::new(Utc::now(), &blink, &posture, &alerts);
            match self.sinks.csv.append(&record).await {
                Ok(()) => self.summary.records_written += 1,
                Err(e) => tracing::warn!(error = %e, "Failed to append health log record"),
            }
            self.push_telemetry(record);
        }

        self.reap_telemetry();
    }

    fn log_due(&self, ts: f64) -> bool {
        self.last_log_ts
            .map_or(true, |last| ts - last > self.log_interval_secs)
    }

    fn push_telemetry(&mut self, record: LogRecord) {
        if !self.sinks.telemetry.is_enabled() {
            return;
        }
        let client = self.sinks.telemetry.clone();
        self.telemetry_tasks
            .spawn(async move { client.push(&record).await });
    }

    fn reap_telemetry(&mut self) {
        while let Some(joined) = self.telemetry_tasks.try_join_next() {
            log_telemetry(joined);
        }
    }

    async fn finish(mut self) -> SessionSummary {
        self.blink.close();
        self.posture.close();

        let pending = self.telemetry_tasks.len();
        if pending > 0 {
            tracing::debug!(pending, "Waiting for in-flight telemetry");
            let drain = async {
                while let Some(joined) = self.telemetry_tasks.join_next().await {
                    log_telemetry(joined);
                }
            };
            if tokio::time::timeout(TELEMETRY_DRAIN_TIMEOUT, drain).await.is_err() {
                tracing::warn!("Telemetry drain timed out, dropping pending pushes");
                self.telemetry_tasks.abort_all();
            }
        }

        self.summary.total_blinks = self.blink.engine().total_blinks();
        tracing::info!(
            frames = self.summary.frames,
            total_blinks = self.summary.total_blinks,
            records = self.summary.records_written,
            "Session finished"
        );
        self.summary
    }
}

fn log_telemetry(joined: Result<TelemetryOutcome, tokio::task::JoinError>) {
    match joined {
        Ok(TelemetryOutcome::Delivered) => tracing::trace!("Telemetry delivered"),
        Ok(TelemetryOutcome::Skipped) => {}
        Ok(TelemetryOutcome::Failed(e)) => tracing::warn!(error = %e, "Telemetry push failed"),
        Err(e) => tracing::warn!(error = %e, "Telemetry task aborted"),
    }
}
