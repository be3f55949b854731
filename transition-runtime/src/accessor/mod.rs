//! # Accessor 模块
//!
//! 属性访问器接口与按类型缓存的访问器注册表。
//!
//! ## 核心概念
//!
//! - `ObjectId`: 目标实例的唯一标识（实例身份，而非值）
//! - `PropertyAccessor`: 单个属性的 getter/setter 能力接口
//! - `Animatable`: 目标类型声明自己有哪些可动画属性
//! - `AnimationTarget`: `Animatable` 的对象安全版本，调度器只持有它
//!
//! 引擎本身不做反射：访问器在类型第一次出现时由 `Animatable::describe`
//! 一次性登记，之后按 (类型, 属性名, 值类型) 直接查表。

mod registry;
mod table;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub use registry::{
    AccessorMap, TypeAccessors, has_accessor, lookup, register_type, registered_count,
    registered_types, try_get_accessor,
};
pub use table::PropertyTable;

/// 对象唯一标识符
///
/// 由目标实例的地址生成：同一个 `Arc` 的所有克隆共享同一个 ID。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    /// 获取目标实例的 ID
    pub fn of(target: &Arc<dyn AnimationTarget>) -> Self {
        Self(Arc::as_ptr(target) as *const () as usize)
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({:#x})", self.0)
    }
}

/// 属性访问器接口
///
/// 目标以 `&dyn Any` 传入，访问器自己负责向下转型；
/// 类型不匹配时 `get` 返回 `None`、`set` 返回 `false`。
pub trait PropertyAccessor<V>: Send + Sync {
    /// 获取当前值
    fn get(&self, target: &dyn Any) -> Option<V>;

    /// 设置新值
    fn set(&self, target: &dyn Any, value: V) -> bool;
}

/// 已登记的属性访问器
pub struct Accessor<V> {
    name: Arc<str>,
    inner: Arc<dyn PropertyAccessor<V>>,
}

impl<V> Clone for Accessor<V> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Accessor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor").field("name", &self.name).finish()
    }
}

impl<V> Accessor<V> {
    /// 包装一个访问器实现
    pub fn new(name: impl Into<Arc<str>>, inner: Arc<dyn PropertyAccessor<V>>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    /// 属性名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 读取目标的当前值
    pub fn get(&self, target: &dyn Any) -> Option<V> {
        self.inner.get(target)
    }

    /// 写入目标
    pub fn set(&self, target: &dyn Any, value: V) -> bool {
        self.inner.set(target, value)
    }
}

/// 可动画类型接口
///
/// 类型通过实现此 trait 声明自己有哪些属性可以被动画。
/// 属性值需要内部可变性：访问器只拿到 `&Self`。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Panel {
///     data: parking_lot::Mutex<PanelData>,
/// }
///
/// impl Animatable for Panel {
///     fn describe(props: &mut PropertyTable<Self>) {
///         props
///             .number("opacity", |p| p.data.lock().opacity, |p, v| p.data.lock().opacity = v)
///             .color("background", |p| p.data.lock().background, |p, v| p.data.lock().background = v);
///     }
/// }
/// ```
pub trait Animatable: Any + Send + Sync + Sized {
    /// 登记所有可动画属性
    fn describe(props: &mut PropertyTable<Self>);
}

/// 对象安全的动画目标
///
/// 为所有 `Animatable` 自动实现，调度器与帧序列构建器只依赖它。
pub trait AnimationTarget: Send + Sync + 'static {
    /// 向下转型入口（访问器使用）
    fn as_any(&self) -> &dyn Any;

    /// 该类型的访问器表（首次访问时登记）
    fn accessors(&self) -> Arc<TypeAccessors>;

    /// 类型名称（用于日志）
    fn type_name(&self) -> &'static str;
}

impl<T: Animatable> AnimationTarget for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn accessors(&self) -> Arc<TypeAccessors> {
        register_type::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
