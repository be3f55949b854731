//! # Custom 模块
//!
//! 用户可扩展的可插值类型。
//!
//! 引擎不知道自定义值如何插值，而是把插值委托给值自身
//! （双重分派）：起始值的 [`Interpolable::interpolate`] 负责生成序列。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::{AnimValue, PropertyValue, ValueKind};
use crate::interpolate::pin_boundaries;

/// 可插值对象接口
///
/// ## 实现示例
///
/// ```rust,ignore
/// #[derive(Debug, PartialEq)]
/// struct Progress(f64);
///
/// impl Interpolable for Progress {
///     fn interpolate(&self, end: &dyn Interpolable, steps: usize) -> Vec<CustomValue> {
///         let Some(end) = end.as_any().downcast_ref::<Progress>() else {
///             return Vec::new();
///         };
///         (0..steps)
///             .map(|i| {
///                 let t = (i + 1) as f64 / steps as f64;
///                 CustomValue::new(Progress(self.0 + (end.0 - self.0) * t))
///             })
///             .collect()
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn equals(&self, other: &dyn Interpolable) -> bool {
///         other.as_any().downcast_ref::<Progress>() == Some(self)
///     }
/// }
/// ```
pub trait Interpolable: fmt::Debug + Send + Sync + 'static {
    /// 生成从 self 到 `end` 的 `steps` 个采样
    ///
    /// 引擎会在返回后强制首尾边界，实现方无需处理。
    fn interpolate(&self, end: &dyn Interpolable, steps: usize) -> Vec<CustomValue>;

    /// 向下转型入口
    fn as_any(&self) -> &dyn Any;

    /// 值相等比较（用于跳过无变化的属性）
    fn equals(&self, other: &dyn Interpolable) -> bool;
}

/// 自定义值句柄
#[derive(Clone)]
pub struct CustomValue(Arc<dyn Interpolable>);

impl CustomValue {
    /// 包装一个可插值对象
    pub fn new(value: impl Interpolable) -> Self {
        Self(Arc::new(value))
    }

    /// 由已有的 Arc 创建
    pub fn from_arc(value: Arc<dyn Interpolable>) -> Self {
        Self(value)
    }

    /// 访问内部对象
    pub fn inner(&self) -> &dyn Interpolable {
        self.0.as_ref()
    }

    /// 向下转型为具体类型
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomValue").field(&self.0).finish()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.equals(other.0.as_ref())
    }
}

impl AnimValue for CustomValue {
    const KIND: ValueKind = ValueKind::Custom;

    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Custom(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Custom(self)
    }

    fn empty() -> Option<Self> {
        None
    }

    /// 自定义值没有零值：
    /// - 缺少终点时返回空序列（该属性被跳过）
    /// - 缺少起点时终点重复 `steps` 次
    fn interpolate(start: Option<&Self>, end: Option<&Self>, steps: usize) -> Vec<Self> {
        let Some(end) = end else {
            return Vec::new();
        };
        if steps == 0 {
            return vec![end.clone()];
        }
        let Some(start) = start else {
            return vec![end.clone(); steps];
        };

        let samples = start.0.interpolate(end.0.as_ref(), steps);
        pin_boundaries(samples, start, end)
    }
}
