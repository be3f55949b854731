//! # State 模块
//!
//! 命名的目标值快照：属性名 -> 目标值，外加可选的逐属性插值覆盖。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::PropertyValue;

/// 逐属性插值覆盖
///
/// 参数依次为起点、终点、帧数；返回的序列长度可以与帧数不同，
/// 播放时越界的帧会被跳过。
pub type InterpolatorOverride = Arc<
    dyn Fn(Option<&PropertyValue>, Option<&PropertyValue>, usize) -> Vec<PropertyValue>
        + Send
        + Sync,
>;

/// 过渡状态
///
/// 克隆即深拷贝：目标值逐个复制，插值覆盖是不可变闭包，共享即可。
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// 状态名
    pub name: String,
    /// 属性名 -> 目标值（`None` 表示按零值处理）
    #[serde(default)]
    pub values: HashMap<String, Option<PropertyValue>>,
    /// 属性名 -> 插值覆盖
    #[serde(skip)]
    pub interpolators: HashMap<String, InterpolatorOverride>,
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overrides: Vec<_> = self.interpolators.keys().collect();
        overrides.sort();
        f.debug_struct("State")
            .field("name", &self.name)
            .field("values", &self.values)
            .field("interpolators", &overrides)
            .finish()
    }
}

impl State {
    /// 创建空状态
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
            interpolators: HashMap::new(),
        }
    }

    /// 设置属性目标值（已存在则覆盖）
    pub fn add_property(
        &mut self,
        property: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> &mut Self {
        self.values.insert(property.into(), Some(value.into()));
        self
    }

    /// 设置一个空目标值
    pub fn add_empty_property(&mut self, property: impl Into<String>) -> &mut Self {
        self.values.insert(property.into(), None);
        self
    }

    /// 链式设置属性
    pub fn with(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.add_property(property, value);
        self
    }

    /// 为属性安装插值覆盖
    pub fn set_interpolator<F>(&mut self, property: impl Into<String>, interpolator: F) -> &mut Self
    where
        F: Fn(Option<&PropertyValue>, Option<&PropertyValue>, usize) -> Vec<PropertyValue>
            + Send
            + Sync
            + 'static,
    {
        self.interpolators
            .insert(property.into(), Arc::new(interpolator));
        self
    }

    /// 移除属性（连同它的插值覆盖）
    pub fn remove_property(&mut self, property: &str) -> Option<Option<PropertyValue>> {
        self.interpolators.remove(property);
        self.values.remove(property)
    }

    /// 获取属性目标值
    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.values.get(property).and_then(Option::as_ref)
    }

    /// 是否包含属性
    pub fn contains(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }

    /// 属性的插值覆盖
    pub fn interpolator(&self, property: &str) -> Option<&InterpolatorOverride> {
        self.interpolators.get(property)
    }

    /// 属性数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有属性
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 按字典序排列的属性名
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Color, Point};

    #[test]
    fn test_add_property_upserts() {
        let mut state = State::new("hover");
        state.add_property("opacity", 0.5);
        state.add_property("opacity", 1.0);

        assert_eq!(state.len(), 1);
        assert_eq!(state.get("opacity"), Some(&PropertyValue::Number(1.0)));
    }

    #[test]
    fn test_empty_property() {
        let mut state = State::new("reset");
        state.add_empty_property("offset");
        assert!(state.contains("offset"));
        assert_eq!(state.get("offset"), None);
    }

    #[test]
    fn test_remove_property_drops_override() {
        let mut state = State::new("s").with("opacity", 1.0);
        state.set_interpolator("opacity", |_, end, _| end.cloned().into_iter().collect());
        assert!(state.interpolator("opacity").is_some());

        assert_eq!(state.remove_property("opacity"), Some(Some(PropertyValue::Number(1.0))));
        assert!(state.interpolator("opacity").is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = State::new("s").with("fill", Color::WHITE);
        let mut copy = original.clone();
        copy.add_property("fill", Color::BLACK);

        assert_eq!(original.get("fill"), Some(&PropertyValue::Color(Color::WHITE)));
        assert_eq!(copy.get("fill"), Some(&PropertyValue::Color(Color::BLACK)));
    }

    #[test]
    fn test_state_from_json() {
        let json = r##"{
            "name": "moved",
            "values": {
                "offset": { "point": { "x": 10.0, "y": 20.0 } },
                "fill": { "color": "#FF336699" },
                "cleared": null
            }
        }"##;
        let state: State = serde_json::from_str(json).unwrap();

        assert_eq!(state.name, "moved");
        assert_eq!(state.property_names(), vec!["cleared", "fill", "offset"]);
        assert_eq!(
            state.get("offset"),
            Some(&PropertyValue::Point(Point::new(10.0, 20.0)))
        );
        assert_eq!(state.get("cleared"), None);
    }
}
