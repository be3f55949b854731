//! # Transform 模块
//!
//! 二维仿射变换矩阵。
//!
//! ```text
//! | m11      m12      0 |
//! | m21      m22      0 |
//! | offset_x offset_y 1 |
//! ```
//!
//! 插值对六个分量分别进行，再由插值后的矩阵重建变换。

use serde::{Deserialize, Serialize};

use super::{Lerp, Point};

/// 二维仿射变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// 由矩阵分量创建
    pub const fn from_matrix(
        m11: f64,
        m12: f64,
        m21: f64,
        m22: f64,
        offset_x: f64,
        offset_y: f64,
    ) -> Self {
        Self {
            m11,
            m12,
            m21,
            m22,
            offset_x,
            offset_y,
        }
    }

    /// 单位变换
    pub const fn identity() -> Self {
        Self::from_matrix(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// 平移
    pub const fn translation(x: f64, y: f64) -> Self {
        Self::from_matrix(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// 缩放
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::from_matrix(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// 旋转（角度制，绕原点）
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::from_matrix(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// 是否为单位变换
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// 先应用 self，再应用 other
    pub fn then(&self, other: &Self) -> Self {
        Self {
            m11: self.m11 * other.m11 + self.m12 * other.m21,
            m12: self.m11 * other.m12 + self.m12 * other.m22,
            m21: self.m21 * other.m11 + self.m22 * other.m21,
            m22: self.m21 * other.m12 + self.m22 * other.m22,
            offset_x: self.offset_x * other.m11 + self.offset_y * other.m21 + other.offset_x,
            offset_y: self.offset_x * other.m12 + self.offset_y * other.m22 + other.offset_y,
        }
    }

    /// 变换一个点
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            p.x * self.m11 + p.y * self.m21 + self.offset_x,
            p.x * self.m12 + p.y * self.m22 + self.offset_y,
        )
    }
}

impl Lerp for Transform2D {
    fn zero() -> Self {
        Self::identity()
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        let l = |a: f64, b: f64| a + (b - a) * t;
        Self::from_matrix(
            l(self.m11, to.m11),
            l(self.m12, to.m12),
            l(self.m21, to.m21),
            l(self.m22, to.m22),
            l(self.offset_x, to.offset_x),
            l(self.offset_y, to.offset_y),
        )
    }
}
