//! # Registry 模块
//!
//! 进程级访问器缓存：`TypeId -> 属性名 -> 访问器`，按值类型分区。
//!
//! 类型第一次出现时登记，之后只读；缓存在进程生命周期内不会被清除。

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use super::{Accessor, Animatable, PropertyTable};
use crate::partition::Partition;
use crate::value::{Color, CornerRadius, CustomValue, Point, Thickness, Transform2D, ValueKind};

/// 单一值类型的访问器表
pub type AccessorMap<V> = HashMap<String, Accessor<V>>;

/// 某个目标类型的全部访问器
#[derive(Debug)]
pub struct TypeAccessors {
    type_name: &'static str,
    pub(crate) numbers: AccessorMap<f64>,
    pub(crate) colors: AccessorMap<Color>,
    pub(crate) transforms: AccessorMap<Transform2D>,
    pub(crate) points: AccessorMap<Point>,
    pub(crate) thicknesses: AccessorMap<Thickness>,
    pub(crate) corner_radii: AccessorMap<CornerRadius>,
    pub(crate) customs: AccessorMap<CustomValue>,
}

impl TypeAccessors {
    pub(crate) fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            numbers: HashMap::new(),
            colors: HashMap::new(),
            transforms: HashMap::new(),
            points: HashMap::new(),
            thicknesses: HashMap::new(),
            corner_radii: HashMap::new(),
            customs: HashMap::new(),
        }
    }

    /// 目标类型名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 查找指定值类型的访问器
    pub fn get<V: Partition>(&self, name: &str) -> Option<&Accessor<V>> {
        V::accessors(self).get(name)
    }

    /// 是否存在 (属性名, 值类型) 对应的访问器
    pub fn contains(&self, name: &str, kind: ValueKind) -> bool {
        match kind {
            ValueKind::Number => self.numbers.contains_key(name),
            ValueKind::Color => self.colors.contains_key(name),
            ValueKind::Transform => self.transforms.contains_key(name),
            ValueKind::Point => self.points.contains_key(name),
            ValueKind::Thickness => self.thicknesses.contains_key(name),
            ValueKind::CornerRadius => self.corner_radii.contains_key(name),
            ValueKind::Custom => self.customs.contains_key(name),
        }
    }

    /// 属性的值类型（未登记返回 None）
    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        ValueKind::ALL
            .into_iter()
            .find(|kind| self.contains(name, *kind))
    }

    /// 已登记属性总数
    pub fn len(&self) -> usize {
        self.numbers.len()
            + self.colors.len()
            + self.transforms.len()
            + self.points.len()
            + self.thicknesses.len()
            + self.corner_radii.len()
            + self.customs.len()
    }

    /// 是否没有任何属性
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static REGISTRY: OnceLock<RwLock<HashMap<TypeId, Arc<TypeAccessors>>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<TypeId, Arc<TypeAccessors>>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// 登记类型（幂等）
///
/// 第一次调用时执行 `T::describe` 并缓存结果；之后直接返回缓存。
pub fn register_type<T: Animatable>() -> Arc<TypeAccessors> {
    let type_id = TypeId::of::<T>();
    if let Some(existing) = registry().read().get(&type_id) {
        return Arc::clone(existing);
    }

    // describe 在锁外执行，允许其中再登记其他类型
    let mut table = PropertyTable::<T>::new();
    T::describe(&mut table);
    let accessors = table.finish();

    let mut map = registry().write();
    let entry = map.entry(type_id).or_insert_with(|| {
        debug!(
            type_name = accessors.type_name(),
            properties = accessors.len(),
            "登记可动画类型"
        );
        Arc::new(accessors)
    });
    Arc::clone(entry)
}

/// 查找已登记类型的访问器表
pub fn lookup(type_id: TypeId) -> Option<Arc<TypeAccessors>> {
    registry().read().get(&type_id).cloned()
}

/// 按 (类型, 属性名, 值类型) 查找访问器
pub fn try_get_accessor<V: Partition>(type_id: TypeId, name: &str) -> Option<Accessor<V>> {
    registry()
        .read()
        .get(&type_id)
        .and_then(|table| table.get::<V>(name).cloned())
}

/// 是否存在 (类型, 属性名, 值类型) 对应的访问器
pub fn has_accessor(type_id: TypeId, name: &str, kind: ValueKind) -> bool {
    registry()
        .read()
        .get(&type_id)
        .is_some_and(|table| table.contains(name, kind))
}

/// 已登记类型数量
pub fn registered_count() -> usize {
    registry().read().len()
}

/// 已登记类型的名称（按字典序）
pub fn registered_types() -> Vec<&'static str> {
    let mut names: Vec<_> = registry()
        .read()
        .values()
        .map(|table| table.type_name())
        .collect();
    names.sort_unstable();
    names
}
