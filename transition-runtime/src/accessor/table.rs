//! # Table 模块
//!
//! `PropertyTable`：`Animatable::describe` 使用的登记器。

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{Accessor, Animatable, PropertyAccessor, TypeAccessors};
use crate::partition::Partition;
use crate::value::{Color, CornerRadius, CustomValue, Point, Thickness, Transform2D};

type Getter<T, V> = Box<dyn Fn(&T) -> Option<V> + Send + Sync>;
type Setter<T, V> = Box<dyn Fn(&T, V) + Send + Sync>;

/// 由闭包组成的访问器
struct FnAccessor<T, V> {
    get: Getter<T, V>,
    set: Setter<T, V>,
}

impl<T: Animatable, V> PropertyAccessor<V> for FnAccessor<T, V> {
    fn get(&self, target: &dyn Any) -> Option<V> {
        target.downcast_ref::<T>().and_then(|t| (self.get)(t))
    }

    fn set(&self, target: &dyn Any, value: V) -> bool {
        match target.downcast_ref::<T>() {
            Some(t) => {
                (self.set)(t, value);
                true
            }
            None => false,
        }
    }
}

/// 属性登记器
pub struct PropertyTable<T> {
    accessors: TypeAccessors,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Animatable> PropertyTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            accessors: TypeAccessors::new(std::any::type_name::<T>()),
            _marker: PhantomData,
        }
    }

    pub(crate) fn finish(self) -> TypeAccessors {
        self.accessors
    }

    /// 登记一个可空属性
    ///
    /// getter 返回 `None` 表示当前没有值（插值时按零值处理）。
    /// 同名属性重复登记时，后登记的覆盖先登记的。
    pub fn property<V: Partition>(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> Option<V> + Send + Sync + 'static,
        set: impl Fn(&T, V) + Send + Sync + 'static,
    ) -> &mut Self {
        let inner: Arc<dyn PropertyAccessor<V>> = Arc::new(FnAccessor {
            get: Box::new(get),
            set: Box::new(set),
        });
        V::accessors_mut(&mut self.accessors).insert(name.to_string(), Accessor::new(name, inner));
        self
    }

    fn required<V: Partition>(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
        set: impl Fn(&T, V) + Send + Sync + 'static,
    ) -> &mut Self {
        self.property(name, move |t| Some(get(t)), set)
    }

    /// 登记数值属性
    pub fn number(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> f64 + Send + Sync + 'static,
        set: impl Fn(&T, f64) + Send + Sync + 'static,
    ) -> &mut Self {
        self.required(name, get, set)
    }

    /// 登记颜色属性
    pub fn color(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> Color + Send + Sync + 'static,
        set: impl Fn(&T, Color) + Send + Sync + 'static,
    ) -> &mut Self {
        self.required(name, get, set)
    }

    /// 登记变换属性
    pub fn transform(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> Transform2D + Send + Sync + 'static,
        set: impl Fn(&T, Transform2D) + Send + Sync + 'static,
    ) -> &mut Self {
        self.required(name, get, set)
    }

    /// 登记点属性
    pub fn point(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> Point + Send + Sync + 'static,
        set: impl Fn(&T, Point) + Send + Sync + 'static,
    ) -> &mut Self {
        self.required(name, get, set)
    }

    /// 登记厚度属性
    pub fn thickness(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> Thickness + Send + Sync + 'static,
        set: impl Fn(&T, Thickness) + Send + Sync + 'static,
    ) -> &mut Self {
        self.required(name, get, set)
    }

    /// 登记圆角属性
    pub fn corner_radius(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> CornerRadius + Send + Sync + 'static,
        set: impl Fn(&T, CornerRadius) + Send + Sync + 'static,
    ) -> &mut Self {
        self.required(name, get, set)
    }

    /// 登记自定义可插值属性
    pub fn custom(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> Option<CustomValue> + Send + Sync + 'static,
        set: impl Fn(&T, CustomValue) + Send + Sync + 'static,
    ) -> &mut Self {
        self.property(name, get, set)
    }
}
