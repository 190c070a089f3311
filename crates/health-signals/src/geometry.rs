//! 二维几何工具
//!
//! 全部为无状态纯函数。退化输入（零长度向量）返回约定的回退值而不是报错。

use std::ops::{Neg, Sub};

use serde::{Deserialize, Serialize};

/// 二维点，也用作二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }

    /// 归一化坐标 → 像素坐标
    pub fn to_pixels(self, width: f64, height: f64) -> Self {
        Self::new(self.x * width, self.y * height)
    }

    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// 两个向量的夹角（度），范围 [0, 180]
///
/// 任一向量长度为 0 时返回 0.0。余弦值先钳制到 [-1, 1]，
/// 避免浮点误差导致 `acos` 返回 NaN。
pub fn angle_between(v1: Point, v2: Point) -> f64 {
    let mag = v1.magnitude() * v2.magnitude();
    if mag == 0.0 {
        return 0.0;
    }
    let cos = (v1.dot(v2) / mag).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}
