use std::sync::{Arc, Mutex};

use health_monitor::frame::{Detection, Frame};
use health_monitor::sinks::notify::{NotifyError, Notifier};
use health_signals::ear::synthetic_eye;
use health_signals::landmarks::{
    LEFT_EYE, LEFT_HIP, LEFT_SHOULDER, RIGHT_EYE, RIGHT_HIP, RIGHT_SHOULDER,
};
use health_signals::Point;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 640;

/// 478 点面部网格，双眼 EAR 均为 `ear`（正方形画面下）
pub fn face_mesh(ear: f64) -> Vec<Point> {
    let mut mesh = vec![Point::new(0.5, 0.5); 478];
    let left = synthetic_eye(0.38, 0.42, ear);
    let right = synthetic_eye(0.62, 0.42, ear);
    for (idx, p) in LEFT_EYE.iter().zip(left.0) {
        mesh[*idx] = p;
    }
    for (idx, p) in RIGHT_EYE.iter().zip(right.0) {
        mesh[*idx] = p;
    }
    mesh
}

/// 33 点人体姿态，躯干向右倾斜 `deg` 度
pub fn pose(deg: f64) -> Vec<Point> {
    let mut landmarks = vec![Point::new(0.5, 0.5); 33];
    let rad = deg.to_radians();
    let hip = Point::new(0.5, 0.85);
    let shoulder = Point::new(hip.x + 0.45 * rad.sin(), hip.y - 0.45 * rad.cos());
    landmarks[LEFT_SHOULDER] = Point::new(shoulder.x - 0.12, shoulder.y);
    landmarks[RIGHT_SHOULDER] = Point::new(shoulder.x + 0.12, shoulder.y);
    landmarks[LEFT_HIP] = Point::new(hip.x - 0.09, hip.y);
    landmarks[RIGHT_HIP] = Point::new(hip.x + 0.09, hip.y);
    landmarks
}

pub fn frame(ts: f64, ear: Option<f64>, tilt: Option<f64>) -> Frame {
    Frame {
        ts,
        width: WIDTH,
        height: HEIGHT,
        face: ear.map(|e| Detection {
            score: 0.95,
            landmarks: face_mesh(e),
        }),
        pose: tilt.map(|d| Detection {
            score: 0.9,
            landmarks: pose(d),
        }),
    }
}

pub fn jsonl(frames: &[Frame]) -> String {
    frames
        .iter()
        .map(|f| serde_json::to_string(f).expect("serialize frame"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 记录所有通知的测试替身
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier lock")
            .push((title.to_string(), message.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
