//! # Transition Runtime
//!
//! 属性过渡引擎：把对象的属性从当前值动画到目标值。
//!
//! ## 架构概述
//!
//! ```text
//! State + TransitionParams
//!         │
//!         ▼
//! build_frame_sequence ──► FrameSequence（按值类型分区的逐帧采样）
//!         │
//!         ▼
//! TransitionScheduler ──空闲──► TransitionInterpreter ──► 逐帧写入目标
//!         │                           │
//!         └──忙碌──► 排队 ◄──播放结束──┘
//! ```
//!
//! 调度器保证每个目标同一时刻只有一个解释器在播放；
//! 解释器在 UI 上下文（tokio runtime）上逐帧写入属性并调用生命周期回调。
//!
//! ## 核心类型
//!
//! - [`Animatable`]：目标类型声明自己的可动画属性
//! - [`State`]：命名的目标值快照
//! - [`TransitionParams`]：时长、帧率、循环、往返、加速度与回调
//! - [`FrameSequence`]：预先计算的逐帧采样表
//! - [`TransitionScheduler`]：每个目标一个的调度器
//!
//! ## 使用示例
//!
//! ```ignore
//! use transition_runtime::{State, TransitionParams, TransitionScheduler};
//!
//! let scheduler = TransitionScheduler::for_target(panel.clone())?;
//! scheduler.transition(
//!     State::new("highlight").with("opacity", 1.0).with("background", Color::WHITE),
//!     TransitionParams::new(0.25).with_acceleration(0.5),
//! )?;
//! ```
//!
//! ## 模块结构
//!
//! - [`value`]：七种值类型与插值规则
//! - [`interpolate`]：插值序列生成
//! - [`accessor`]：属性访问器与按类型缓存的注册表
//! - [`state`]、[`params`]、[`frames`]：过渡的输入与预计算
//! - [`runtime`]：调度器与解释器
//! - [`scene`]：JSON 场景文件
//! - [`config`]、[`error`]：配置与错误类型

pub mod accessor;
pub mod config;
pub mod error;
pub mod frames;
pub mod interpolate;
pub mod params;
mod partition;
pub mod runtime;
pub mod scene;
pub mod state;
pub mod value;

// 重导出核心类型
pub use accessor::{
    Accessor, Animatable, AnimationTarget, ObjectId, PropertyAccessor, PropertyTable,
    TypeAccessors, has_accessor, register_type, registered_types, try_get_accessor,
};
pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, SceneError, TransitionError, TransitionResult};
pub use frames::{FrameSequence, Track, build_frame_sequence};
pub use interpolate::{interpolate, interpolate_value};
pub use params::{DispatchPriority, Hooks, LoopCount, TransitionParams};
pub use partition::Partition;
pub use runtime::{
    InterpreterPhase, PlaybackOutcome, SchedulerPhase, TransitionInterpreter,
    TransitionScheduler, UiContext, scheduler_for,
};
pub use scene::{Scene, Sprite, SpriteData};
pub use state::{InterpolatorOverride, State};
pub use value::{
    AnimValue, Color, CornerRadius, CustomValue, Interpolable, Lerp, Point, PropertyValue,
    Thickness, Transform2D, ValueKind,
};
