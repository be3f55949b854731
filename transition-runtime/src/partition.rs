//! # Partition 模块
//!
//! 值类型到分区的静态映射。
//!
//! 访问器表和帧序列都按值类型分成七个分区。`Partition` 让泛型代码
//! 直接拿到对应分区，播放循环中每个分区都是单态的。

use crate::accessor::{AccessorMap, TypeAccessors};
use crate::frames::{FrameSequence, Track};
use crate::value::{AnimValue, Color, CornerRadius, CustomValue, Point, Thickness, Transform2D};

/// 按值类型选取分区
pub trait Partition: AnimValue {
    /// 访问器表中的分区
    fn accessors(table: &TypeAccessors) -> &AccessorMap<Self>;

    /// 访问器表中的分区（可变）
    fn accessors_mut(table: &mut TypeAccessors) -> &mut AccessorMap<Self>;

    /// 帧序列中的分区
    fn tracks(frames: &FrameSequence) -> &[Track<Self>];

    /// 帧序列中的分区（可变）
    fn tracks_mut(frames: &mut FrameSequence) -> &mut Vec<Track<Self>>;
}

macro_rules! impl_partition {
    ($ty:ty, $accessors:ident, $tracks:ident) => {
        impl Partition for $ty {
            fn accessors(table: &TypeAccessors) -> &AccessorMap<Self> {
                &table.$accessors
            }

            fn accessors_mut(table: &mut TypeAccessors) -> &mut AccessorMap<Self> {
                &mut table.$accessors
            }

            fn tracks(frames: &FrameSequence) -> &[Track<Self>] {
                &frames.$tracks
            }

            fn tracks_mut(frames: &mut FrameSequence) -> &mut Vec<Track<Self>> {
                &mut frames.$tracks
            }
        }
    };
}

impl_partition!(f64, numbers, numbers);
impl_partition!(Color, colors, colors);
impl_partition!(Transform2D, transforms, transforms);
impl_partition!(Point, points, points);
impl_partition!(Thickness, thicknesses, thicknesses);
impl_partition!(CornerRadius, corner_radii, corner_radii);
impl_partition!(CustomValue, customs, customs);
