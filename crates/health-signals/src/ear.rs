//! EAR (Eye Aspect Ratio) 计算模块
//!
//! 公式: EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)
//! - p1, p4: 眼角点（水平方向）
//! - p2, p3: 上眼睑点
//! - p5, p6: 下眼睑点
//!
//! 计算前先把归一化坐标换算到像素空间，否则非正方形画面会扭曲比例。

use crate::landmarks::{EyePair, EyeSample};

/// 单眼 EAR。水平距离为 0 时返回 0.0
pub fn eye_aspect_ratio(eye: &EyeSample, width: f64, height: f64) -> f64 {
    let [p1, p2, p3, p4, p5, p6] = eye.0.map(|p| p.to_pixels(width, height));

    let horizontal = p1.distance(&p4);
    if horizontal == 0.0 {
        return 0.0;
    }
    let vertical1 = p2.distance(&p6);
    let vertical2 = p3.distance(&p5);
    (vertical1 + vertical2) / (2.0 * horizontal)
}

/// 双眼 EAR 平均值
pub fn binocular_ear(eyes: &EyePair, width: f64, height: f64) -> f64 {
    let left = eye_aspect_ratio(&eyes.left, width, height);
    let right = eye_aspect_ratio(&eyes.right, width, height);
    (left + right) / 2.0
}

/// 构造一只 EAR 恰为 `ear` 的合成眼睛，供测试使用
///
/// 眼宽 0.1（归一化），以 (cx, cy) 为中心；在正方形画面下 EAR 精确等于 `ear`。
#[doc(hidden)]
pub fn synthetic_eye(cx: f64, cy: f64, ear: f64) -> EyeSample {
    use crate::geometry::Point;

    let half_w = 0.05;
    let half_h = ear * 0.1 / 2.0;
    EyeSample([
        Point::new(cx - half_w, cy),
        Point::new(cx - 0.02, cy - half_h),
        Point::new(cx + 0.02, cy - half_h),
        Point::new(cx + half_w, cy),
        Point::new(cx + 0.02, cy + half_h),
        Point::new(cx - 0.02, cy + half_h),
    ])
}
