//! # Interpreter 模块
//!
//! 播放一个帧序列直到结束。
//!
//! ## 播放流程
//!
//! 每轮（共 `loop_time + 1` 轮，或无限）：
//!
//! 1. 非首轮且不往返时，先把所有属性写回第 0 帧
//! 2. 正向扫描：每帧先检查终止条件，然后依次执行帧前回调、写入、
//!    帧后回调，最后等待帧间隔
//! 3. 往返时再反向扫描一次
//!
//! 终止条件只在每帧开头检查一次，停止请求不会打断正在写入的帧。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tracing::{debug, trace};

use crate::accessor::AnimationTarget;
use crate::frames::FrameSequence;
use crate::params::TransitionParams;

static NEXT_INTERPRETER_ID: AtomicU64 = AtomicU64::new(1);

/// 解释器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpreterPhase {
    /// 已创建，尚未播放
    #[default]
    Created,
    /// 正在播放
    Running,
    /// 正常播放结束
    Completed,
    /// 被停止或重置
    Stopped,
}

impl InterpreterPhase {
    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }
}

/// 播放结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// 全部轮次播放完毕
    Completed,
    /// 收到停止请求后结束（已调用完成回调）
    Stopped,
    /// 被重置或目标已释放（未调用完成回调）
    Reset,
    /// 回调或访问器 panic，播放任务异常退出
    Aborted,
}

/// 解释器控制标志
///
/// 与调度器共享，跨线程读写。
#[derive(Debug)]
pub struct InterpreterControl {
    id: u64,
    running: AtomicBool,
    stop: AtomicBool,
    reset: AtomicBool,
}

impl InterpreterControl {
    fn new() -> Self {
        Self {
            id: NEXT_INTERPRETER_ID.fetch_add(1, Ordering::Relaxed),
            running: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            reset: AtomicBool::new(false),
        }
    }

    /// 解释器 ID（进程内唯一）
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 是否正在播放
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// 请求在下一帧开头停止
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// 请求静默退出（不调用完成回调）
    pub fn request_reset(&self) {
        self.reset.store(true, Ordering::Release);
        self.stop.store(true, Ordering::Release);
    }

    /// 是否已请求停止
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// 是否已请求重置
    pub fn reset_requested(&self) -> bool {
        self.reset.load(Ordering::Acquire)
    }
}

/// 过渡解释器
///
/// 持有参数与帧序列的独立副本；目标只以弱引用持有，
/// 目标释放后按重置处理。
pub struct TransitionInterpreter {
    control: Arc<InterpreterControl>,
    target: Weak<dyn AnimationTarget>,
    params: TransitionParams,
    frames: FrameSequence,
    loop_index: u64,
    phase: InterpreterPhase,
}

impl std::fmt::Debug for TransitionInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionInterpreter")
            .field("id", &self.control.id)
            .field("phase", &self.phase)
            .field("loop_index", &self.loop_index)
            .field("frames", &self.frames.frame_count())
            .finish()
    }
}

impl TransitionInterpreter {
    /// 创建解释器
    pub fn new(
        target: &Arc<dyn AnimationTarget>,
        params: TransitionParams,
        frames: FrameSequence,
    ) -> Self {
        Self {
            control: Arc::new(InterpreterControl::new()),
            target: Arc::downgrade(target),
            params,
            frames,
            loop_index: 0,
            phase: InterpreterPhase::Created,
        }
    }

    /// 控制标志
    pub fn control(&self) -> Arc<InterpreterControl> {
        Arc::clone(&self.control)
    }

    /// 当前状态
    pub fn phase(&self) -> InterpreterPhase {
        self.phase
    }

    /// 已完成的轮数
    pub fn loop_index(&self) -> u64 {
        self.loop_index
    }

    /// 播放的帧序列
    pub fn frames(&self) -> &FrameSequence {
        &self.frames
    }

    /// 播放直到结束
    ///
    /// 已在播放或已停止时不播放，直接结束。
    pub async fn run(&mut self) -> PlaybackOutcome {
        if self.phase != InterpreterPhase::Created
            || self.control.running.swap(true, Ordering::AcqRel)
            || self.control.stop_requested()
        {
            return self.finalize();
        }

        self.phase = InterpreterPhase::Running;
        debug!(
            interpreter = self.control.id,
            frames = self.frames.frame_count(),
            properties = self.frames.property_count(),
            "开始播放"
        );
        self.params.start.invoke();

        let count = self.frames.frame_count();
        let fallback = self.params.delta_time();
        loop {
            let loop_index = self.loop_index;
            if self
                .params
                .loop_time
                .passes()
                .is_some_and(|passes| loop_index >= passes)
            {
                break;
            }

            let delays = self.params.frame_delays();
            let delay_at = |index: usize| delays.get(index).copied().unwrap_or(fallback);

            // 两轮之间收到的停止请求不再写回首帧
            if self.loop_index > 0 && self.should_terminate() {
                return self.finalize();
            }

            if self.loop_index > 0 && !self.params.auto_reverse {
                match self.target.upgrade() {
                    Some(target) => {
                        self.frames.apply(target.as_ref(), 0);
                    }
                    None => return self.finalize_target_lost(),
                }
            }

            for index in 0..count {
                if !self.play_frame(index, delay_at(index)).await {
                    return self.finalize();
                }
            }

            if self.params.auto_reverse {
                for (step, index) in (0..count).rev().enumerate() {
                    if !self.play_frame(index, delay_at(step)).await {
                        return self.finalize();
                    }
                }
            }

            self.loop_index += 1;
            trace!(interpreter = self.control.id, pass = self.loop_index, "一轮播放结束");
        }

        self.finalize()
    }

    /// 播放一帧；返回 false 表示应当终止
    async fn play_frame(&mut self, index: usize, delay: Duration) -> bool {
        if self.should_terminate() {
            return false;
        }

        if self.params.priority.is_deferred() {
            tokio::task::yield_now().await;
            if self.should_terminate() {
                return false;
            }
        }

        let Some(target) = self.target.upgrade() else {
            trace!(interpreter = self.control.id, "目标已释放");
            self.control.request_reset();
            return false;
        };

        self.params.update.invoke();
        let written = self.frames.apply(target.as_ref(), index);
        drop(target);
        self.params.late_update.invoke();
        trace!(interpreter = self.control.id, index, written, "写入帧");

        tokio::time::sleep(delay).await;
        true
    }

    fn should_terminate(&self) -> bool {
        self.control.stop_requested() || self.control.reset_requested()
    }

    fn finalize_target_lost(&mut self) -> PlaybackOutcome {
        self.control.request_reset();
        self.finalize()
    }

    fn finalize(&mut self) -> PlaybackOutcome {
        self.control.running.store(false, Ordering::Release);

        if self.control.reset_requested() {
            debug!(interpreter = self.control.id, "播放被重置");
            self.phase = InterpreterPhase::Stopped;
            return PlaybackOutcome::Reset;
        }

        self.params.completed.invoke();
        let outcome = if self.control.stop_requested() {
            self.phase = InterpreterPhase::Stopped;
            PlaybackOutcome::Stopped
        } else {
            self.phase = InterpreterPhase::Completed;
            PlaybackOutcome::Completed
        };
        debug!(interpreter = self.control.id, ?outcome, "播放结束");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{Animatable, PropertyTable};
    use crate::frames::build_frame_sequence;
    use crate::params::LoopCount;
    use crate::state::State;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Meter {
        value: Mutex<f64>,
        history: Mutex<Vec<f64>>,
    }

    impl Animatable for Meter {
        fn describe(props: &mut PropertyTable<Self>) {
            props.number(
                "value",
                |m| *m.value.lock(),
                |m, v| {
                    *m.value.lock() = v;
                    m.history.lock().push(v);
                },
            );
        }
    }

    fn setup(params: &TransitionParams) -> (Arc<Meter>, Arc<dyn AnimationTarget>, FrameSequence) {
        let meter = Arc::new(Meter::default());
        let target: Arc<dyn AnimationTarget> = meter.clone();
        let state = State::new("full").with("value", 4.0);
        let frames = build_frame_sequence(target.as_ref(), &state, params);
        (meter, target, frames)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_pass() {
        let completed = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&completed);
        let params = TransitionParams::new(0.4)
            .with_frame_rate(10)
            .on_completed(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        let (meter, target, frames) = setup(&params);

        let mut interpreter = TransitionInterpreter::new(&target, params, frames);
        assert_eq!(interpreter.run().await, PlaybackOutcome::Completed);

        assert_eq!(*meter.history.lock(), vec![0.0, 2.0, 3.0, 4.0]);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
        assert_eq!(interpreter.phase(), InterpreterPhase::Completed);
        assert_eq!(interpreter.loop_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_reverse() {
        let params = TransitionParams::new(0.3)
            .with_frame_rate(10)
            .with_auto_reverse(true);
        let (meter, target, frames) = setup(&params);

        let mut interpreter = TransitionInterpreter::new(&target, params, frames);
        interpreter.run().await;

        let history = meter.history.lock().clone();
        assert_eq!(history.len(), 6);
        assert_eq!(history[2], 4.0);
        assert_eq!(history[5], 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_between_passes_keeps_last_frame() {
        let completed = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&completed);
        let params = TransitionParams::new(0.3)
            .with_frame_rate(10)
            .with_loop(LoopCount::Count(2))
            .on_completed(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        let (meter, target, frames) = setup(&params);

        let mut interpreter = TransitionInterpreter::new(&target, params, frames);
        let control = interpreter.control();
        let task = tokio::spawn(async move { interpreter.run().await });

        // 第一轮最后一帧写入之后、本轮等待结束之前
        tokio::time::sleep(Duration::from_millis(250)).await;
        control.request_stop();
        assert_eq!(task.await.unwrap(), PlaybackOutcome::Stopped);

        let history = meter.history.lock().clone();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2], 4.0);
        assert_eq!(*meter.value.lock(), 4.0);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_is_noop() {
        let completed = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&completed);
        let params = TransitionParams::new(0.2)
            .with_frame_rate(10)
            .on_completed(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        let (meter, target, frames) = setup(&params);

        let mut interpreter = TransitionInterpreter::new(&target, params, frames);
        interpreter.run().await;
        let writes = meter.history.lock().len();

        interpreter.run().await;
        assert_eq!(meter.history.lock().len(), writes);
        assert_eq!(completed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_before_start_is_silent() {
        let completed = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&completed);
        let params = TransitionParams::new(0.2)
            .with_frame_rate(10)
            .with_loop(LoopCount::Infinite)
            .on_completed(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        let (meter, target, frames) = setup(&params);

        let mut interpreter = TransitionInterpreter::new(&target, params, frames);
        interpreter.control().request_reset();
        assert_eq!(interpreter.run().await, PlaybackOutcome::Reset);
        assert!(meter.history.lock().is_empty());
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_dropped_mid_playback() {
        let params = TransitionParams::new(1.0).with_frame_rate(10);
        let (meter, target, frames) = setup(&params);
        let mut interpreter = TransitionInterpreter::new(&target, params, frames);
        drop(target);
        drop(meter);

        assert_eq!(interpreter.run().await, PlaybackOutcome::Reset);
    }
}
