//! # Color 模块
//!
//! ARGB 颜色（纯色画刷）。插值在字节空间逐通道进行，小数部分截断。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Lerp;

/// ARGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// 完全透明
    pub const TRANSPARENT: Color = Color::from_argb(0, 0, 0, 0);
    /// 不透明黑色
    pub const BLACK: Color = Color::from_argb(255, 0, 0, 0);
    /// 不透明白色
    pub const WHITE: Color = Color::from_argb(255, 255, 255, 255);

    /// 由四个通道创建
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// 创建不透明颜色
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(255, r, g, b)
    }
}

/// 字节通道插值，截断小数
fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * t) as u8
}

impl Lerp for Color {
    fn zero() -> Self {
        Color::TRANSPARENT
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        Self {
            a: lerp_channel(self.a, to.a, t),
            r: lerp_channel(self.r, to.r, t),
            g: lerp_channel(self.g, to.g, t),
            b: lerp_channel(self.b, to.b, t),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    /// 支持 `#AARRGGBB` 与 `#RRGGBB`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("颜色必须以 '#' 开头: {s}"))?;

        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .ok_or_else(|| format!("无效的颜色: {s}"))
        };

        match hex.len() {
            8 => Ok(Color::from_argb(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            6 => Ok(Color::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
            _ => Err(format!("无效的颜色长度: {s}")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}
