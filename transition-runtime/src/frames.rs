//! # Frames 模块
//!
//! 帧序列：一次过渡中所有变化属性的逐帧采样表。
//!
//! ## 结构
//!
//! 帧序列按值类型分成七个分区，每个分区是一组 [`Track`]，
//! 每条轨道把一个访问器和它的逐帧采样配对。
//!
//! 构建时读取目标的当前值作为起点；当前值已经等于目标值的属性
//! 不会产生轨道。

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::accessor::{Accessor, AnimationTarget, TypeAccessors};
use crate::params::TransitionParams;
use crate::partition::Partition;
use crate::state::State;
use crate::value::{
    AnimValue, Color, CornerRadius, CustomValue, Point, PropertyValue, Thickness, Transform2D,
    ValueKind,
};

/// 单个属性的逐帧采样
#[derive(Debug, Clone)]
pub struct Track<V> {
    /// 属性访问器
    pub accessor: Accessor<V>,
    /// 逐帧采样，最后一帧等于目标值
    pub frames: Vec<V>,
}

impl<V: AnimValue> Track<V> {
    /// 属性名
    pub fn name(&self) -> &str {
        self.accessor.name()
    }

    /// 写入第 `index` 帧（越界时跳过）
    fn apply(&self, target: &dyn AnimationTarget, index: usize) -> bool {
        match self.frames.get(index) {
            Some(value) => self.accessor.set(target.as_any(), value.clone()),
            None => {
                trace!(property = self.name(), index, "帧索引越界，跳过写入");
                false
            }
        }
    }
}

/// 帧序列
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frame_count: usize,
    pub(crate) numbers: Vec<Track<f64>>,
    pub(crate) colors: Vec<Track<Color>>,
    pub(crate) transforms: Vec<Track<Transform2D>>,
    pub(crate) points: Vec<Track<Point>>,
    pub(crate) thicknesses: Vec<Track<Thickness>>,
    pub(crate) corner_radii: Vec<Track<CornerRadius>>,
    pub(crate) customs: Vec<Track<CustomValue>>,
}

impl FrameSequence {
    /// 创建空序列
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            ..Self::default()
        }
    }

    /// 帧数（至少为最长轨道的长度）
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// 追加轨道
    pub fn push<V: Partition>(&mut self, track: Track<V>) {
        self.frame_count = self.frame_count.max(track.frames.len());
        V::tracks_mut(self).push(track);
    }

    /// 指定值类型的全部轨道
    pub fn tracks<V: Partition>(&self) -> &[Track<V>] {
        V::tracks(self)
    }

    /// 轨道总数
    pub fn property_count(&self) -> usize {
        self.numbers.len()
            + self.colors.len()
            + self.transforms.len()
            + self.points.len()
            + self.thicknesses.len()
            + self.corner_radii.len()
            + self.customs.len()
    }

    /// 是否没有任何轨道
    pub fn is_empty(&self) -> bool {
        self.property_count() == 0
    }

    /// 是否包含某个属性的轨道
    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    /// 属性所在的分区
    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        fn has<V: Partition>(frames: &FrameSequence, name: &str) -> bool {
            V::tracks(frames).iter().any(|t| t.name() == name)
        }

        if has::<f64>(self, name) {
            Some(ValueKind::Number)
        } else if has::<Color>(self, name) {
            Some(ValueKind::Color)
        } else if has::<Transform2D>(self, name) {
            Some(ValueKind::Transform)
        } else if has::<Point>(self, name) {
            Some(ValueKind::Point)
        } else if has::<Thickness>(self, name) {
            Some(ValueKind::Thickness)
        } else if has::<CornerRadius>(self, name) {
            Some(ValueKind::CornerRadius)
        } else if has::<CustomValue>(self, name) {
            Some(ValueKind::Custom)
        } else {
            None
        }
    }

    /// 某个属性的逐帧采样
    pub fn frame_values<V: Partition>(&self, name: &str) -> Option<&[V]> {
        V::tracks(self)
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.frames.as_slice())
    }

    /// 写入第 `index` 帧的全部属性，返回实际写入的数量
    pub fn apply(&self, target: &dyn AnimationTarget, index: usize) -> usize {
        fn apply_partition<V: Partition>(
            frames: &FrameSequence,
            target: &dyn AnimationTarget,
            index: usize,
        ) -> usize {
            V::tracks(frames)
                .iter()
                .filter(|track| track.apply(target, index))
                .count()
        }

        apply_partition::<f64>(self, target, index)
            + apply_partition::<Color>(self, target, index)
            + apply_partition::<Transform2D>(self, target, index)
            + apply_partition::<Point>(self, target, index)
            + apply_partition::<Thickness>(self, target, index)
            + apply_partition::<CornerRadius>(self, target, index)
            + apply_partition::<CustomValue>(self, target, index)
    }

    /// 以属性名为键的类型擦除采样表（用于导出与检查）
    pub fn to_table(&self) -> BTreeMap<String, Vec<PropertyValue>> {
        fn collect<V: Partition>(
            frames: &FrameSequence,
            table: &mut BTreeMap<String, Vec<PropertyValue>>,
        ) {
            for track in V::tracks(frames) {
                let values = track.frames.iter().cloned().map(V::into_value).collect();
                table.insert(track.name().to_string(), values);
            }
        }

        let mut table = BTreeMap::new();
        collect::<f64>(self, &mut table);
        collect::<Color>(self, &mut table);
        collect::<Transform2D>(self, &mut table);
        collect::<Point>(self, &mut table);
        collect::<Thickness>(self, &mut table);
        collect::<CornerRadius>(self, &mut table);
        collect::<CustomValue>(self, &mut table);
        table
    }
}

/// 构建帧序列
///
/// 只读取目标的当前值，不修改目标。
pub fn build_frame_sequence(
    target: &dyn AnimationTarget,
    state: &State,
    params: &TransitionParams,
) -> FrameSequence {
    let table = target.accessors();
    let steps = params.frame_count();
    let mut frames = FrameSequence::new(steps);

    build_partition::<f64>(&mut frames, target, &table, state, steps);
    build_partition::<Color>(&mut frames, target, &table, state, steps);
    build_partition::<Transform2D>(&mut frames, target, &table, state, steps);
    build_partition::<Point>(&mut frames, target, &table, state, steps);
    build_partition::<Thickness>(&mut frames, target, &table, state, steps);
    build_partition::<CornerRadius>(&mut frames, target, &table, state, steps);
    build_partition::<CustomValue>(&mut frames, target, &table, state, steps);

    debug!(
        target_type = target.type_name(),
        state = %state.name,
        frames = frames.frame_count(),
        properties = frames.property_count(),
        "帧序列构建完成"
    );
    frames
}

fn build_partition<V: Partition>(
    frames: &mut FrameSequence,
    target: &dyn AnimationTarget,
    table: &TypeAccessors,
    state: &State,
    steps: usize,
) {
    for name in state.property_names() {
        // 不属于此分区或未登记的属性直接跳过
        let Some(accessor) = table.get::<V>(name) else {
            continue;
        };

        // 空值与类型不匹配的值都按该类型的零值比较
        let end_value = state.values.get(name).and_then(Option::as_ref);
        let end = end_value.and_then(V::from_value).or_else(V::empty);
        let current = accessor.get(target.as_any()).or_else(V::empty);
        if current == end {
            trace!(property = name, kind = %V::KIND, "当前值已等于目标值，跳过");
            continue;
        }

        let samples = match state.interpolator(name) {
            Some(interpolator) => {
                let start = current.clone().map(V::into_value);
                interpolator(start.as_ref(), end_value, steps)
                    .iter()
                    .filter_map(V::from_value)
                    .collect()
            }
            None => V::interpolate(current.as_ref(), end.as_ref(), steps),
        };

        if samples.is_empty() {
            trace!(property = name, kind = %V::KIND, "插值结果为空，跳过");
            continue;
        }

        frames.push(Track {
            accessor: accessor.clone(),
            frames: samples,
        });
    }
}
