//! # Scene 模块
//!
//! JSON 场景文件：一个演示目标、一组状态和一份播放列表。
//!
//! ```json
//! {
//!   "target": { "opacity": 0.0, "position": { "x": 0.0, "y": 0.0 } },
//!   "states": [
//!     { "name": "shown", "values": { "opacity": { "number": 1.0 } } }
//!   ],
//!   "play": [
//!     { "state": "shown", "params": { "duration": 0.5, "frame_rate": 30 } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::accessor::{Animatable, PropertyTable, register_type};
use crate::error::{SceneError, TransitionResult};
use crate::frames::build_frame_sequence;
use crate::params::TransitionParams;
use crate::runtime::TransitionScheduler;
use crate::state::State;
use crate::value::{Color, CornerRadius, Point, PropertyValue, Thickness, Transform2D};

/// 演示目标的属性值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteData {
    pub opacity: f64,
    pub width: f64,
    pub height: f64,
    pub background: Color,
    pub foreground: Color,
    pub transform: Transform2D,
    pub position: Point,
    pub margin: Thickness,
    pub padding: Thickness,
    pub corner_radius: CornerRadius,
}

impl Default for SpriteData {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            width: 0.0,
            height: 0.0,
            background: Color::TRANSPARENT,
            foreground: Color::BLACK,
            transform: Transform2D::identity(),
            position: Point::origin(),
            margin: Thickness::default(),
            padding: Thickness::default(),
            corner_radius: CornerRadius::default(),
        }
    }
}

/// 演示目标：覆盖全部内置值类型的可动画对象
#[derive(Debug, Default)]
pub struct Sprite {
    data: Mutex<SpriteData>,
}

impl Sprite {
    /// 以初始值创建
    pub fn new(data: SpriteData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }

    /// 当前属性值快照
    pub fn snapshot(&self) -> SpriteData {
        self.data.lock().clone()
    }
}

impl Animatable for Sprite {
    fn describe(props: &mut PropertyTable<Self>) {
        props
            .number("opacity", |s| s.data.lock().opacity, |s, v| s.data.lock().opacity = v)
            .number("width", |s| s.data.lock().width, |s, v| s.data.lock().width = v)
            .number("height", |s| s.data.lock().height, |s, v| s.data.lock().height = v)
            .color(
                "background",
                |s| s.data.lock().background,
                |s, v| s.data.lock().background = v,
            )
            .color(
                "foreground",
                |s| s.data.lock().foreground,
                |s, v| s.data.lock().foreground = v,
            )
            .transform(
                "transform",
                |s| s.data.lock().transform,
                |s, v| s.data.lock().transform = v,
            )
            .point("position", |s| s.data.lock().position, |s, v| s.data.lock().position = v)
            .thickness("margin", |s| s.data.lock().margin, |s, v| s.data.lock().margin = v)
            .thickness("padding", |s| s.data.lock().padding, |s, v| s.data.lock().padding = v)
            .corner_radius(
                "corner_radius",
                |s| s.data.lock().corner_radius,
                |s, v| s.data.lock().corner_radius = v,
            );
    }
}

/// 播放列表中的一项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayStep {
    /// 状态名
    pub state: String,
    /// 过渡参数
    #[serde(default)]
    pub params: TransitionParams,
}

/// 场景
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// 演示目标的初始值
    #[serde(default)]
    pub target: SpriteData,
    /// 状态定义
    #[serde(default)]
    pub states: Vec<State>,
    /// 播放列表
    #[serde(default)]
    pub play: Vec<PlayStep>,
}

/// 单步预览：该步的帧序列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepPreview {
    pub state: String,
    pub frame_count: usize,
    pub properties: BTreeMap<String, Vec<PropertyValue>>,
}

impl Scene {
    /// 解析并验证
    pub fn from_json(content: &str) -> Result<Self, SceneError> {
        let scene: Self =
            serde_json::from_str(content).map_err(|e| SceneError::Parse(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| SceneError::Io(e.to_string()))?;
        Self::from_json(&content)
    }

    /// 验证场景
    ///
    /// - 状态中的每个属性都必须是演示目标上同类型的可动画属性
    /// - 播放列表只能引用已定义的状态，且参数合法
    pub fn validate(&self) -> Result<(), SceneError> {
        let accessors = register_type::<Sprite>();

        for state in &self.states {
            for name in state.property_names() {
                let known = match state.get(name) {
                    Some(value) => accessors.contains(name, value.kind()),
                    None => accessors.kind_of(name).is_some(),
                };
                if !known {
                    return Err(SceneError::UnknownProperty {
                        state: state.name.clone(),
                        property: name.to_string(),
                    });
                }
            }
        }

        for (index, step) in self.play.iter().enumerate() {
            if !self.states.iter().any(|s| s.name == step.state) {
                return Err(SceneError::UndefinedState {
                    index,
                    state: step.state.clone(),
                });
            }
            step.params
                .validate()
                .map_err(|source| SceneError::InvalidParams { index, source })?;
        }
        Ok(())
    }

    /// 按初始值创建演示目标
    pub fn sprite(&self) -> Arc<Sprite> {
        Arc::new(Sprite::new(self.target.clone()))
    }

    /// 把全部状态添加到调度器
    pub fn install(&self, scheduler: &TransitionScheduler) {
        for state in &self.states {
            scheduler.add_state(state.clone());
        }
    }

    /// 按顺序提交播放列表
    pub fn enqueue_all(&self, scheduler: &TransitionScheduler) -> TransitionResult<()> {
        for step in &self.play {
            scheduler.enqueue(&step.state, step.params.clone(), None)?;
        }
        Ok(())
    }

    /// 不等待地预览每一步的帧序列
    ///
    /// 每一步都从上一步结束时的值开始构建，与实际播放一致。
    pub fn preview(&self) -> Vec<StepPreview> {
        let sprite = self.sprite();
        let mut previews = Vec::with_capacity(self.play.len());

        for step in &self.play {
            let Some(state) = self.states.iter().find(|s| s.name == step.state) else {
                continue;
            };
            let frames = build_frame_sequence(sprite.as_ref(), state, &step.params);
            if let Some(last) = frames.frame_count().checked_sub(1) {
                frames.apply(sprite.as_ref(), last);
            }
            previews.push(StepPreview {
                state: step.state.clone(),
                frame_count: frames.frame_count(),
                properties: frames.to_table(),
            });
        }
        previews
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r##"{
        "target": { "opacity": 0.0 },
        "states": [
            { "name": "shown", "values": { "opacity": { "number": 1.0 }, "background": { "color": "#FF000000" } } },
            { "name": "hidden", "values": { "opacity": { "number": 0.0 } } }
        ],
        "play": [
            { "state": "shown", "params": { "duration": 0.2, "frame_rate": 10 } },
            { "state": "hidden", "params": { "duration": 0.4, "frame_rate": 10 } }
        ]
    }"##;

    #[test]
    fn test_parse_and_validate() {
        let scene = Scene::from_json(SCENE).unwrap();
        assert_eq!(scene.states.len(), 2);
        assert_eq!(scene.play.len(), 2);
        assert_eq!(scene.target.opacity, 0.0);
        assert_eq!(scene.target.foreground, Color::BLACK);
    }

    #[test]
    fn test_undefined_state() {
        let json = r#"{ "states": [], "play": [{ "state": "ghost" }] }"#;
        assert_eq!(
            Scene::from_json(json).unwrap_err(),
            SceneError::UndefinedState {
                index: 0,
                state: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_property() {
        let json = r#"{ "states": [{ "name": "s", "values": { "glow": { "number": 1.0 } } }] }"#;
        assert!(matches!(
            Scene::from_json(json),
            Err(SceneError::UnknownProperty { .. })
        ));

        // 类型不匹配同样视为未知属性
        let json = r#"{ "states": [{ "name": "s", "values": { "opacity": { "point": { "x": 1.0, "y": 1.0 } } } }] }"#;
        assert!(matches!(
            Scene::from_json(json),
            Err(SceneError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_invalid_params() {
        let json = r#"{
            "states": [{ "name": "s" }],
            "play": [{ "state": "s", "params": { "duration": -1.0 } }]
        }"#;
        assert!(matches!(
            Scene::from_json(json),
            Err(SceneError::InvalidParams { index: 0, .. })
        ));
    }

    #[test]
    fn test_preview_chains_steps() {
        let scene = Scene::from_json(SCENE).unwrap();
        let previews = scene.preview();

        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].frame_count, 2);
        assert_eq!(
            previews[0].properties.get("opacity"),
            Some(&vec![PropertyValue::Number(0.0), PropertyValue::Number(1.0)])
        );
        assert!(previews[0].properties.contains_key("background"));

        // 第二步从 1.0 开始
        let hidden = previews[1].properties.get("opacity").unwrap();
        assert_eq!(hidden.first(), Some(&PropertyValue::Number(1.0)));
        assert_eq!(hidden.last(), Some(&PropertyValue::Number(0.0)));
        assert_eq!(previews[1].frame_count, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Scene::load(dir.path().join("none.json")),
            Err(SceneError::Io(_))
        ));
    }
}
