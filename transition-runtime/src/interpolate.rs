//! # Interpolate 模块
//!
//! 插值序列生成。
//!
//! 所有值类型共享同一个采样约定：
//!
//! - 返回 `steps` 个采样，采样 `i`（从 0 开始）对应参数 `t = (i + 1) / steps`
//! - `steps > 1` 时，第 0 个采样强制等于 `start`，最后一个强制等于 `end`，
//!   覆盖任何数值误差
//! - `steps == 0` 时返回 `[end]`
//! - 空输入使用该类型的零值

use crate::value::{
    AnimValue, Color, CornerRadius, CustomValue, Lerp, Point, PropertyValue, Thickness,
    Transform2D, ValueKind,
};

/// 泛型插值入口
pub fn interpolate<V: AnimValue>(start: Option<&V>, end: Option<&V>, steps: usize) -> Vec<V> {
    V::interpolate(start, end, steps)
}

/// 基于 [`Lerp`] 的线性采样
pub fn linear_sequence<V: Lerp + Clone>(start: Option<&V>, end: Option<&V>, steps: usize) -> Vec<V> {
    let start = start.cloned().unwrap_or_else(V::zero);
    let end = end.cloned().unwrap_or_else(V::zero);
    sample_with(&start, &end, steps, |s, e, t| s.lerp(e, t))
}

/// 按采样约定调用 `f(start, end, t)` 生成序列
pub fn sample_with<V, F>(start: &V, end: &V, steps: usize, f: F) -> Vec<V>
where
    V: Clone,
    F: Fn(&V, &V, f64) -> V,
{
    if steps == 0 {
        return vec![end.clone()];
    }

    let samples = (0..steps)
        .map(|i| f(start, end, (i + 1) as f64 / steps as f64))
        .collect();
    pin_boundaries(samples, start, end)
}

/// 强制首尾边界
pub(crate) fn pin_boundaries<V: Clone>(mut samples: Vec<V>, start: &V, end: &V) -> Vec<V> {
    let len = samples.len();
    if len > 1 {
        samples[0] = start.clone();
    }
    if let Some(last) = samples.last_mut() {
        *last = end.clone();
    }
    samples
}

/// 类型擦除的插值
///
/// `start` / `end` 中与 `kind` 不匹配的值按空值处理。
pub fn interpolate_value(
    kind: ValueKind,
    start: Option<&PropertyValue>,
    end: Option<&PropertyValue>,
    steps: usize,
) -> Vec<PropertyValue> {
    fn erased<V: AnimValue>(
        start: Option<&PropertyValue>,
        end: Option<&PropertyValue>,
        steps: usize,
    ) -> Vec<PropertyValue> {
        let start = start.and_then(V::from_value);
        let end = end.and_then(V::from_value);
        V::interpolate(start.as_ref(), end.as_ref(), steps)
            .into_iter()
            .map(V::into_value)
            .collect()
    }

    match kind {
        ValueKind::Number => erased::<f64>(start, end, steps),
        ValueKind::Color => erased::<Color>(start, end, steps),
        ValueKind::Transform => erased::<Transform2D>(start, end, steps),
        ValueKind::Point => erased::<Point>(start, end, steps),
        ValueKind::Thickness => erased::<Thickness>(start, end, steps),
        ValueKind::CornerRadius => erased::<CornerRadius>(start, end, steps),
        ValueKind::Custom => erased::<CustomValue>(start, end, steps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_steps_returns_end() {
        assert_eq!(interpolate::<f64>(Some(&1.0), Some(&5.0), 0), vec![5.0]);
    }

    #[test]
    fn test_single_step_is_end() {
        assert_eq!(interpolate::<f64>(Some(&1.0), Some(&5.0), 1), vec![5.0]);
    }

    #[test]
    fn test_boundaries_are_exact() {
        let start = 0.1;
        let end = 0.7;
        let frames = interpolate::<f64>(Some(&start), Some(&end), 7);
        assert_eq!(frames.len(), 7);
        assert_eq!(frames[0], start);
        assert_eq!(frames[6], end);
    }

    #[test]
    fn test_none_defaults_to_zero() {
        let frames = interpolate::<Point>(None, Some(&Point::new(4.0, 8.0)), 4);
        assert_eq!(frames[0], Point::origin());
        assert_eq!(frames[1], Point::new(2.0, 4.0));

        let frames = interpolate::<Color>(Some(&Color::WHITE), None, 2);
        assert_eq!(frames[1], Color::TRANSPARENT);

        let frames = interpolate::<Transform2D>(None, None, 3);
        assert!(frames.iter().all(Transform2D::is_identity));
    }

    #[test]
    fn test_interpolate_value_kind_mismatch_uses_zero() {
        let frames = interpolate_value(
            ValueKind::Number,
            Some(&PropertyValue::Point(Point::new(1.0, 1.0))),
            Some(&PropertyValue::Number(10.0)),
            2,
        );
        assert_eq!(frames, vec![PropertyValue::Number(0.0), PropertyValue::Number(10.0)]);
    }

    #[test]
    fn test_pin_boundaries_ragged() {
        assert!(pin_boundaries(Vec::<f64>::new(), &0.0, &1.0).is_empty());
        assert_eq!(pin_boundaries(vec![0.5], &0.0, &1.0), vec![1.0]);
    }
}
