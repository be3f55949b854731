//! # Params 模块
//!
//! 过渡参数：时长、帧率、循环、往返、加速度、调度优先级与四组生命周期钩子。
//!
//! ## 时间模型
//!
//! - 帧数 = `max(round(duration × frame_rate), 2)`，帧率先限制到 `[1, max_frame_rate]`
//! - 帧数超过 [`MAX_FRAME_COUNT`] 的参数在校验时被拒绝
//! - 帧间隔 = `1 / frame_rate` 秒
//! - 加速度不改变采样值，只改变帧间隔：每轮的间隔序列从
//!   `δ × (1 + acc)` 线性变化到 `δ × (1 - acc)`

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{TransitionError, TransitionResult};
use crate::interpolate::interpolate;

/// 最少帧数
pub const MIN_FRAME_COUNT: usize = 2;

/// 单轮最多帧数
pub const MAX_FRAME_COUNT: usize = 1_000_000;

/// 循环次数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LoopRepr", into = "LoopRepr")]
pub enum LoopCount {
    /// 额外重复次数（0 = 只播放一轮）
    Count(u32),
    /// 无限循环
    Infinite,
}

impl Default for LoopCount {
    fn default() -> Self {
        LoopCount::Count(0)
    }
}

impl LoopCount {
    /// 总轮数（无限循环返回 None）
    pub fn passes(&self) -> Option<u64> {
        match self {
            LoopCount::Count(n) => Some(u64::from(*n) + 1),
            LoopCount::Infinite => None,
        }
    }

    /// 是否无限循环
    pub fn is_infinite(&self) -> bool {
        matches!(self, LoopCount::Infinite)
    }
}

/// JSON 表示：非负整数或字符串 `"infinite"`
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LoopRepr {
    Count(u32),
    Word(String),
}

impl TryFrom<LoopRepr> for LoopCount {
    type Error = String;

    fn try_from(repr: LoopRepr) -> Result<Self, Self::Error> {
        match repr {
            LoopRepr::Count(n) => Ok(LoopCount::Count(n)),
            LoopRepr::Word(word) if word.eq_ignore_ascii_case("infinite") => {
                Ok(LoopCount::Infinite)
            }
            LoopRepr::Word(word) => Err(format!("无效的循环次数: {word}")),
        }
    }
}

impl From<LoopCount> for LoopRepr {
    fn from(count: LoopCount) -> Self {
        match count {
            LoopCount::Count(n) => LoopRepr::Count(n),
            LoopCount::Infinite => LoopRepr::Word("infinite".to_string()),
        }
    }
}

/// UI 调度优先级
///
/// `Input` 与 `Background` 为延后优先级：每帧写入前先让出一次 UI 上下文，
/// 让同一上下文上的其他任务先执行。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPriority {
    /// 同步（最高）
    Send,
    /// 普通
    #[default]
    Normal,
    /// 渲染
    Render,
    /// 输入之后
    Input,
    /// 后台（最低）
    Background,
}

impl DispatchPriority {
    /// 是否在每帧写入前让出
    pub fn is_deferred(&self) -> bool {
        matches!(self, DispatchPriority::Input | DispatchPriority::Background)
    }
}

/// 生命周期回调
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// 有序回调列表
#[derive(Clone, Default)]
pub struct Hooks(Vec<Hook>);

impl Hooks {
    /// 追加回调
    pub fn push(&mut self, hook: impl Fn() + Send + Sync + 'static) {
        self.0.push(Arc::new(hook));
    }

    /// 按注册顺序依次调用
    pub fn invoke(&self) {
        for hook in &self.0 {
            hook();
        }
    }

    /// 回调数量
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 移除全部回调
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hooks({})", self.0.len())
    }
}

fn default_frame_rate() -> u32 {
    config::global().default_frame_rate
}

/// 过渡参数
///
/// 克隆会复制全部标量字段和回调订阅。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionParams {
    /// 时长（秒）
    pub duration: f64,
    /// 帧率（帧/秒），读取时限制到 `[1, max_frame_rate]`
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// 循环次数
    pub loop_time: LoopCount,
    /// 是否往返播放
    pub auto_reverse: bool,
    /// 加速度，读取时限制到 `[-1, 1]`
    pub acceleration: f64,
    /// UI 调度优先级
    pub priority: DispatchPriority,
    /// 开始播放时调用一次
    #[serde(skip)]
    pub start: Hooks,
    /// 每帧写入前调用
    #[serde(skip)]
    pub update: Hooks,
    /// 每帧写入后调用
    #[serde(skip)]
    pub late_update: Hooks,
    /// 正常结束或被中断后调用（被重置时不调用）
    #[serde(skip)]
    pub completed: Hooks,
}

impl Default for TransitionParams {
    fn default() -> Self {
        Self {
            duration: 0.0,
            frame_rate: default_frame_rate(),
            loop_time: LoopCount::default(),
            auto_reverse: false,
            acceleration: 0.0,
            priority: DispatchPriority::default(),
            start: Hooks::default(),
            update: Hooks::default(),
            late_update: Hooks::default(),
            completed: Hooks::default(),
        }
    }
}

impl TransitionParams {
    /// 以指定时长创建参数
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// 设置帧率
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// 设置循环次数
    pub fn with_loop(mut self, loop_time: LoopCount) -> Self {
        self.loop_time = loop_time;
        self
    }

    /// 设置往返播放
    pub fn with_auto_reverse(mut self, auto_reverse: bool) -> Self {
        self.auto_reverse = auto_reverse;
        self
    }

    /// 设置加速度
    pub fn with_acceleration(mut self, acceleration: f64) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// 设置调度优先级
    pub fn with_priority(mut self, priority: DispatchPriority) -> Self {
        self.priority = priority;
        self
    }

    /// 追加开始回调
    pub fn on_start(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.start.push(hook);
        self
    }

    /// 追加帧前回调
    pub fn on_update(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.update.push(hook);
        self
    }

    /// 追加帧后回调
    pub fn on_late_update(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.late_update.push(hook);
        self
    }

    /// 追加完成回调
    pub fn on_completed(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.completed.push(hook);
        self
    }

    /// 检查前置条件
    pub fn validate(&self) -> TransitionResult<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(TransitionError::InvalidDuration {
                duration: self.duration,
            });
        }
        if self.frame_rate == 0 {
            return Err(TransitionError::InvalidFrameRate {
                frame_rate: self.frame_rate,
            });
        }
        let frames = (self.duration * f64::from(self.effective_frame_rate())).round();
        if frames > MAX_FRAME_COUNT as f64 {
            return Err(TransitionError::TooManyFrames {
                duration: self.duration,
                max: MAX_FRAME_COUNT,
            });
        }
        Ok(())
    }

    /// 生效帧率（受全局上限约束）
    pub fn effective_frame_rate(&self) -> u32 {
        config::global().clamp_frame_rate(self.frame_rate)
    }

    /// 生效加速度
    pub fn effective_acceleration(&self) -> f64 {
        if self.acceleration.is_finite() {
            self.acceleration.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// 帧数
    pub fn frame_count(&self) -> usize {
        let duration = if self.duration.is_finite() {
            self.duration.max(0.0)
        } else {
            0.0
        };
        let frames = (duration * f64::from(self.effective_frame_rate())).round();
        (frames as usize).clamp(MIN_FRAME_COUNT, MAX_FRAME_COUNT)
    }

    /// 基础帧间隔
    pub fn delta_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.effective_frame_rate()))
    }

    /// 一轮播放中每帧之后的等待时间
    pub fn frame_delays(&self) -> Vec<Duration> {
        let count = self.frame_count();
        let delta = self.delta_time();
        let acceleration = self.effective_acceleration();
        if acceleration == 0.0 {
            return vec![delta; count];
        }

        let base = delta.as_secs_f64();
        let first = base * (1.0 + acceleration);
        let last = base * (1.0 - acceleration);
        interpolate::<f64>(Some(&first), Some(&last), count)
            .into_iter()
            .map(|secs| Duration::from_secs_f64(secs.max(0.0)))
            .collect()
    }
}
