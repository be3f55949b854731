//! # Geometry 模块
//!
//! 点、四边厚度、四角圆角。各分量独立线性插值。

use serde::{Deserialize, Serialize};

use super::Lerp;

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// 二维点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// 创建新的点
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 原点
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

impl Lerp for Point {
    fn zero() -> Self {
        Self::origin()
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        Self {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// 四边厚度（外边距、内边距、边框宽度）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thickness {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Thickness {
    /// 分别指定四边
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// 四边相同
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

impl Lerp for Thickness {
    fn zero() -> Self {
        Self::uniform(0.0)
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        Self {
            left: lerp(self.left, to.left, t),
            top: lerp(self.top, to.top, t),
            right: lerp(self.right, to.right, t),
            bottom: lerp(self.bottom, to.bottom, t),
        }
    }
}

/// 四角圆角半径
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerRadius {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

impl CornerRadius {
    /// 分别指定四角（顺时针，从左上开始）
    pub const fn new(top_left: f64, top_right: f64, bottom_right: f64, bottom_left: f64) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// 四角相同
    pub const fn uniform(radius: f64) -> Self {
        Self::new(radius, radius, radius, radius)
    }
}

impl Lerp for CornerRadius {
    fn zero() -> Self {
        Self::uniform(0.0)
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        Self {
            top_left: lerp(self.top_left, to.top_left, t),
            top_right: lerp(self.top_right, to.top_right, t),
            bottom_right: lerp(self.bottom_right, to.bottom_right, t),
            bottom_left: lerp(self.bottom_left, to.bottom_left, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_lerp() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(10.0, 20.0);
        let mid = p1.lerp(&p2, 0.5);
        assert_eq!(mid, Point::new(5.0, 10.0));
    }

    #[test]
    fn test_thickness_lerp_independent_sides() {
        let from = Thickness::new(0.0, 10.0, 20.0, 30.0);
        let to = Thickness::uniform(40.0);
        let mid = from.lerp(&to, 0.5);
        assert_eq!(mid, Thickness::new(20.0, 25.0, 30.0, 35.0));
    }

    #[test]
    fn test_corner_radius_lerp() {
        let from = CornerRadius::zero();
        let to = CornerRadius::new(4.0, 8.0, 12.0, 16.0);
        let quarter = from.lerp(&to, 0.25);
        assert_eq!(quarter, CornerRadius::new(1.0, 2.0, 3.0, 4.0));
    }
}
