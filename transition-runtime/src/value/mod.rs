//! # Value 模块
//!
//! 可动画值的七种类型（value kind）以及它们的插值规则。
//!
//! ## 核心概念
//!
//! - [`ValueKind`]: 值类型标签，帧序列按它分区
//! - [`PropertyValue`]: 类型擦除后的属性值，供 [`State`](crate::State) 使用
//! - [`Lerp`]: 内置值类型的线性插值
//! - [`AnimValue`]: 帧序列构建器所需的统一接口

mod color;
mod custom;
mod geometry;
mod transform;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interpolate::linear_sequence;

pub use color::Color;
pub use custom::{CustomValue, Interpolable};
pub use geometry::{CornerRadius, Point, Thickness};
pub use transform::Transform2D;

/// 值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// 数值（f64）
    Number,
    /// 颜色 / 纯色画刷
    Color,
    /// 二维仿射变换
    Transform,
    /// 点
    Point,
    /// 四边厚度
    Thickness,
    /// 四角圆角
    CornerRadius,
    /// 用户自定义可插值类型
    Custom,
}

impl ValueKind {
    /// 全部值类型，顺序即帧序列分区顺序
    pub const ALL: [ValueKind; 7] = [
        ValueKind::Number,
        ValueKind::Color,
        ValueKind::Transform,
        ValueKind::Point,
        ValueKind::Thickness,
        ValueKind::CornerRadius,
        ValueKind::Custom,
    ];

    /// 名称（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::Color => "color",
            ValueKind::Transform => "transform",
            ValueKind::Point => "point",
            ValueKind::Thickness => "thickness",
            ValueKind::CornerRadius => "corner_radius",
            ValueKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 类型擦除的属性值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Number(f64),
    Color(Color),
    Transform(Transform2D),
    Point(Point),
    Thickness(Thickness),
    CornerRadius(CornerRadius),
    /// 自定义值不参与序列化
    #[serde(skip)]
    Custom(CustomValue),
}

impl PropertyValue {
    /// 值类型
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Number(_) => ValueKind::Number,
            PropertyValue::Color(_) => ValueKind::Color,
            PropertyValue::Transform(_) => ValueKind::Transform,
            PropertyValue::Point(_) => ValueKind::Point,
            PropertyValue::Thickness(_) => ValueKind::Thickness,
            PropertyValue::CornerRadius(_) => ValueKind::CornerRadius,
            PropertyValue::Custom(_) => ValueKind::Custom,
        }
    }

    /// 以 f64 读取（仅 Number）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for PropertyValue {
            fn from(value: $ty) -> Self {
                PropertyValue::$variant(value)
            }
        }
    };
}

impl_from_value!(f64, Number);
impl_from_value!(Color, Color);
impl_from_value!(Transform2D, Transform);
impl_from_value!(Point, Point);
impl_from_value!(Thickness, Thickness);
impl_from_value!(CornerRadius, CornerRadius);
impl_from_value!(CustomValue, Custom);

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Number(value as f64)
    }
}

/// 内置值类型的线性插值
pub trait Lerp: Sized {
    /// 空值 / 非法值的替代值
    fn zero() -> Self;

    /// 在 `self` 与 `to` 之间按 `t` 插值（`t = 0` 为 self，`t = 1` 为 to）
    fn lerp(&self, to: &Self, t: f64) -> Self;
}

/// 可被帧序列驱动的值
///
/// 每种值类型实现一次；帧序列的每个分区只包含同一种类型，
/// 因此播放循环内不需要逐元素的动态分派。
pub trait AnimValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// 对应的值类型标签
    const KIND: ValueKind;

    /// 从类型擦除值中取出（类型不匹配返回 None）
    fn from_value(value: &PropertyValue) -> Option<Self>;

    /// 转换为类型擦除值
    fn into_value(self) -> PropertyValue;

    /// 空值的替代值（没有零值的类型返回 None）
    fn empty() -> Option<Self>;

    /// 计算 `steps` 个插值采样
    ///
    /// 采样 `i` 对应 `t = (i + 1) / steps`；`steps > 1` 时首尾分别强制等于
    /// `start` 与 `end`；`steps == 0` 时返回 `[end]`。
    fn interpolate(start: Option<&Self>, end: Option<&Self>, steps: usize) -> Vec<Self>;
}

impl Lerp for f64 {
    fn zero() -> Self {
        0.0
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl AnimValue for f64 {
    const KIND: ValueKind = ValueKind::Number;

    fn from_value(value: &PropertyValue) -> Option<Self> {
        value.as_number()
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Number(self)
    }

    fn empty() -> Option<Self> {
        Some(0.0)
    }

    fn interpolate(start: Option<&Self>, end: Option<&Self>, steps: usize) -> Vec<Self> {
        // NaN / 无穷视为非法输入
        let start = start.filter(|v| v.is_finite());
        let end = end.filter(|v| v.is_finite());
        linear_sequence(start, end, steps)
    }
}

macro_rules! impl_anim_value {
    ($ty:ty, $variant:ident) => {
        impl AnimValue for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn from_value(value: &PropertyValue) -> Option<Self> {
                match value {
                    PropertyValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self) -> PropertyValue {
                PropertyValue::$variant(self)
            }

            fn empty() -> Option<Self> {
                Some(<$ty as Lerp>::zero())
            }

            fn interpolate(start: Option<&Self>, end: Option<&Self>, steps: usize) -> Vec<Self> {
                linear_sequence(start, end, steps)
            }
        }
    };
}

impl_anim_value!(Color, Color);
impl_anim_value!(Transform2D, Transform);
impl_anim_value!(Point, Point);
impl_anim_value!(Thickness, Thickness);
impl_anim_value!(CornerRadius, CornerRadius);
