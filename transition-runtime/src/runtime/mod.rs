//! # Runtime 模块
//!
//! 过渡的调度与播放。
//!
//! ## 核心概念
//!
//! - `UiContext`: 属性写入和回调执行的上下文（tokio runtime）
//! - `TransitionScheduler`: 每个目标一个，保证同一时刻只有一个解释器
//! - `TransitionInterpreter`: 播放一个帧序列直到结束
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let scheduler = TransitionScheduler::for_target(sprite.clone())?;
//! scheduler.add_state(State::new("faded").with("opacity", 0.0));
//!
//! scheduler.enqueue("faded", TransitionParams::new(0.3), None)?;
//! scheduler.wait_idle().await;
//! ```

mod context;
mod interpreter;
mod pool;
mod scheduler;

pub use context::UiContext;
pub use interpreter::{InterpreterControl, InterpreterPhase, PlaybackOutcome, TransitionInterpreter};
pub use pool::{pooled_count, prune, scheduler_for};
pub use scheduler::{PendingTransition, SchedulerPhase, TransitionScheduler};
