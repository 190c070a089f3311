//! 帧来源
//!
//! 外部关键点估计进程每帧输出一行 JSON：
//!
//! ```json
//! {"ts": 12.48, "width": 640, "height": 480,
//!  "face": {"score": 0.93, "landmarks": [{"x": 0.41, "y": 0.37}, ...]},
//!  "pose": null}
//! ```
//!
//! `face` 为面部网格（478 点），`pose` 为人体姿态（33 点），未检测到时为 null 或缺省。

use std::future::Future;
use std::io::{self, BufRead};
use std::thread;

use health_signals::Point;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;

use crate::error::MonitorError;

/// 读取线程与帧循环之间缓冲的行数
const LINE_BUFFER: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// 单调时间戳（秒）
    pub ts: f64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub face: Option<Detection>,
    #[serde(default)]
    pub pose: Option<Detection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default = "default_score")]
    pub score: f64,
    pub landmarks: Vec<Point>,
}

fn default_score() -> f64 {
    1.0
}

/// 逐行输入
pub trait LineSource {
    /// 下一行（不含换行符）；输入结束时返回 `Ok(None)`
    fn next_line(&mut self) -> impl Future<Output = io::Result<Option<String>>>;
}

impl<R> LineSource for Lines<R>
where
    R: AsyncBufRead + Unpin,
{
    fn next_line(&mut self) -> impl Future<Output = io::Result<Option<String>>> {
        Lines::next_line(self)
    }
}

/// 在独立线程上做阻塞读取，经有界通道把行交给帧循环
///
/// 线程不归运行时所有：运行时关闭时不会等待一个停在 `read` 上的线程。
/// 接收端被丢弃后，线程在下一行到来时退出。
#[derive(Debug)]
pub struct BlockingLines {
    rx: mpsc::Receiver<io::Result<String>>,
}

impl BlockingLines {
    pub fn spawn<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        thread::Builder::new()
            .name("frame-reader".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let failed = line.is_err();
                    if tx.blocking_send(line).is_err() || failed {
                        break;
                    }
                }
            })?;
        Ok(Self { rx })
    }

    pub fn stdin() -> io::Result<Self> {
        Self::spawn(io::BufReader::new(io::stdin()))
    }
}

impl LineSource for BlockingLines {
    fn next_line(&mut self) -> impl Future<Output = io::Result<Option<String>>> {
        async move { self.rx.recv().await.transpose() }
    }
}

/// 进程的帧输入：标准输入或 JSONL 文件
#[derive(Debug)]
pub enum FrameInput {
    Stdin(BlockingLines),
    File(Lines<BufReader<File>>),
}

impl FrameInput {
    /// `-` 表示标准输入，否则按文件路径打开
    pub async fn open(path: &str) -> Result<Self, MonitorError> {
        let source_err = |source: io::Error| MonitorError::FrameSource {
            path: path.to_string(),
            source,
        };
        if path == "-" {
            tracing::info!("Reading frames from stdin");
            return BlockingLines::stdin().map(Self::Stdin).map_err(source_err);
        }
        let file = File::open(path).await.map_err(source_err)?;
        tracing::info!(path, "Reading frames from file");
        Ok(Self::File(BufReader::new(file).lines()))
    }
}

impl LineSource for FrameInput {
    fn next_line(&mut self) -> impl Future<Output = io::Result<Option<String>>> {
        async move {
            match self {
                Self::Stdin(lines) => lines.next_line().await,
                Self::File(lines) => lines.next_line().await,
            }
        }
    }
}

/// 按行读取 JSONL 帧
pub struct JsonlFrameSource<L> {
    lines: L,
    line_no: u64,
    skipped: u64,
}

impl<R> JsonlFrameSource<Lines<R>>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::from_lines(reader.lines())
    }
}

impl<L> JsonlFrameSource<L>
where
    L: LineSource,
{
    pub fn from_lines(lines: L) -> Self {
        Self {
            lines,
            line_no: 0,
            skipped: 0,
        }
    }

    /// 下一帧；流结束或读取失败时返回 None
    ///
    /// 空行跳过，无法解析的行记录告警后跳过。
    pub async fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        line = self.line_no,
                        "Frame stream read failed, ending session"
                    );
                    return None;
                }
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Frame>(trimmed) {
                Ok(frame) => return Some(frame),
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(error = %e, line = self.line_no, "Skipping malformed frame");
                }
            }
        }
    }

    /// 因格式错误被跳过的行数
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn reads_frames_and_skips_garbage() {
        let input = concat!(
            "{\"ts\":0.0,\"width\":640,\"height\":480}\n",
            "\n",
            "not json\n",
            "{\"ts\":0.1,\"width\":640,\"height\":480,\"pose\":{\"landmarks\":[{\"x\":0.5,\"y\":0.5}]}}\n",
        );
        let mut source = JsonlFrameSource::new(input.as_bytes());

        let first = source.next_frame().await.unwrap();
        assert!(first.face.is_none());
        assert!(first.pose.is_none());

        let second = source.next_frame().await.unwrap();
        let pose = second.pose.unwrap();
        assert_eq!(pose.score, 1.0);
        assert_eq!(pose.landmarks.len(), 1);

        assert!(source.next_frame().await.is_none());
        assert_eq!(source.skipped(), 1);
    }

    /// 永远停在 `read` 上的输入，模拟空闲的标准输入
    struct Stalled;

    impl io::Read for Stalled {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            loop {
                thread::park();
            }
        }
    }

    #[tokio::test]
    async fn blocking_lines_deliver_in_order() {
        let input = io::Cursor::new("{\"ts\":0.0,\"width\":1,\"height\":1}\nnope\n");
        let mut source = JsonlFrameSource::from_lines(BlockingLines::spawn(input).unwrap());

        assert_eq!(source.next_frame().await.unwrap().ts, 0.0);
        assert!(source.next_frame().await.is_none());
        assert_eq!(source.skipped(), 1);
    }

    #[test]
    fn stalled_reader_does_not_hold_runtime_shutdown() {
        let (done_tx, done_rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let mut lines = BlockingLines::spawn(io::BufReader::new(Stalled)).unwrap();
                let pending =
                    tokio::time::timeout(Duration::from_millis(50), lines.next_line()).await;
                assert!(pending.is_err());
            });
            drop(rt);
            done_tx.send(()).unwrap();
        });
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("runtime shut down while the reader was blocked");
    }

    #[tokio::test]
    async fn missing_file_is_a_frame_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.jsonl");
        let err = FrameInput::open(&path.to_string_lossy()).await.unwrap_err();
        assert!(matches!(err, MonitorError::FrameSource { .. }));
    }
}
