//! # Scheduler 模块
//!
//! 每个目标实例一个调度器：同一时刻最多一个解释器在播放，
//! 其余请求按 FIFO 顺序排队。
//!
//! ## 状态机
//!
//! ```text
//! Idle ──enqueue──► Running ──播放结束 / 中断──► Running（队列非空）或 Idle
//!   ▲                  │
//!   └──── dispose ─────┴──► Resetting（旧解释器退出后）──► Idle
//! ```
//!
//! 调度器的全部可变字段由同一把锁保护；锁只在同步代码中持有，
//! 不会跨越等待点。构建帧序列会读取目标属性，此时不持有锁，
//! 访问器可以安全地查询调度器。
//!
//! 播放任务中的 panic 由任务守卫吸收，队列照常推进。

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use super::context::UiContext;
use super::interpreter::{InterpreterControl, PlaybackOutcome, TransitionInterpreter};
use crate::accessor::{AnimationTarget, ObjectId};
use crate::error::{TransitionError, TransitionResult};
use crate::frames::{FrameSequence, build_frame_sequence};
use crate::params::TransitionParams;
use crate::state::State;

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// 没有解释器，队列为空
    Idle,
    /// 有一个解释器在播放，或正在准备下一个
    Running,
    /// 已释放，等待旧解释器退出
    Resetting,
}

/// 排队中的过渡请求
#[derive(Debug, Clone)]
pub struct PendingTransition {
    /// 状态名
    pub state: String,
    /// 过渡参数
    pub params: TransitionParams,
    /// 预先构建的帧序列（None 表示开始时再构建）
    pub frames: Option<FrameSequence>,
}

#[derive(Default)]
struct SchedulerCore {
    current_state: Option<String>,
    current: Option<Arc<InterpreterControl>>,
    pending: VecDeque<PendingTransition>,
    states: HashMap<String, State>,
    /// 被 dispose 的解释器，退出前处于 Resetting
    draining: Option<u64>,
    /// 正在锁外构建下一个请求的帧序列
    starting: bool,
    /// 构建期间收到的中断请求
    stop_on_start: bool,
    /// 每次 dispose 递增，构建中的请求据此判断是否已被丢弃
    generation: u64,
}

impl SchedulerCore {
    fn phase(&self) -> SchedulerPhase {
        if self.current.is_some() || self.starting {
            SchedulerPhase::Running
        } else if self.draining.is_some() {
            SchedulerPhase::Resetting
        } else {
            SchedulerPhase::Idle
        }
    }

    /// 标记开始构建下一个请求，返回当前代数
    fn begin_start(&mut self) -> u64 {
        self.starting = true;
        self.stop_on_start = false;
        self.generation
    }
}

struct SchedulerShared {
    id: ObjectId,
    target: Weak<dyn AnimationTarget>,
    context: UiContext,
    core: Mutex<SchedulerCore>,
    idle: watch::Sender<bool>,
}

/// 过渡调度器
///
/// 克隆共享同一个调度器。
#[derive(Clone)]
pub struct TransitionScheduler {
    shared: Arc<SchedulerShared>,
}

impl std::fmt::Debug for TransitionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.shared.core.lock();
        f.debug_struct("TransitionScheduler")
            .field("target", &self.shared.id)
            .field("phase", &core.phase())
            .field("current_state", &core.current_state)
            .field("pending", &core.pending.len())
            .field("states", &core.states.len())
            .finish()
    }
}

impl TransitionScheduler {
    /// 获取目标的调度器（同一目标始终返回同一个调度器）
    pub fn for_target(target: Arc<dyn AnimationTarget>) -> TransitionResult<Self> {
        super::pool::scheduler_for(target)
    }

    /// 创建绑定到指定 UI 上下文的独立调度器（不进入全局池）
    pub fn with_context(target: Arc<dyn AnimationTarget>, context: UiContext) -> Self {
        let (idle, _) = watch::channel(true);
        Self {
            shared: Arc::new(SchedulerShared {
                id: ObjectId::of(&target),
                target: Arc::downgrade(&target),
                context,
                core: Mutex::new(SchedulerCore::default()),
                idle,
            }),
        }
    }

    /// 目标 ID
    pub fn id(&self) -> ObjectId {
        self.shared.id
    }

    /// 目标（已释放时返回 None）
    pub fn target(&self) -> Option<Arc<dyn AnimationTarget>> {
        self.shared.target.upgrade()
    }

    /// 两个句柄是否指向同一个调度器
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    // ========== 状态管理 ==========

    /// 添加状态（同名状态被替换）
    pub fn add_state(&self, state: State) {
        self.shared
            .core
            .lock()
            .states
            .insert(state.name.clone(), state);
    }

    /// 获取状态副本
    pub fn state(&self, name: &str) -> Option<State> {
        self.shared.core.lock().states.get(name).cloned()
    }

    /// 移除状态
    pub fn remove_state(&self, name: &str) -> Option<State> {
        self.shared.core.lock().states.remove(name)
    }

    /// 已添加的状态名（按字典序）
    pub fn state_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.shared.core.lock().states.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    // ========== 播放控制 ==========

    /// 请求过渡到指定状态
    ///
    /// 空闲时立即开始播放（不阻塞调用方）；否则追加到队列末尾。
    /// `frames` 为 None 时，帧序列在开始播放时按目标的当前值构建。
    pub fn enqueue(
        &self,
        state_name: &str,
        params: TransitionParams,
        frames: Option<FrameSequence>,
    ) -> TransitionResult<()> {
        params.validate()?;
        if self.shared.target.upgrade().is_none() {
            return Err(TransitionError::MissingTarget);
        }

        let mut core = self.shared.core.lock();
        if !core.states.contains_key(state_name) {
            return Err(TransitionError::UnknownState {
                name: state_name.to_string(),
            });
        }

        let request = PendingTransition {
            state: state_name.to_string(),
            params,
            frames,
        };

        if core.current.is_some() || core.starting {
            core.pending.push_back(request);
            debug!(
                target = %self.shared.id,
                state = state_name,
                pending = core.pending.len(),
                "过渡请求已排队"
            );
            return Ok(());
        }

        let generation = core.begin_start();
        self.shared.publish_idle(&core);
        drop(core);

        self.shared.launch(request, generation);
        Ok(())
    }

    /// 添加状态并请求过渡
    pub fn transition(&self, state: State, params: TransitionParams) -> TransitionResult<()> {
        let name = state.name.clone();
        self.add_state(state);
        self.enqueue(&name, params, None)
    }

    /// 按目标的当前值预先构建帧序列
    pub fn preload(
        &self,
        state_name: &str,
        params: &TransitionParams,
    ) -> TransitionResult<FrameSequence> {
        params.validate()?;
        let target = self
            .shared
            .target
            .upgrade()
            .ok_or(TransitionError::MissingTarget)?;
        let state = self
            .state(state_name)
            .ok_or_else(|| TransitionError::UnknownState {
                name: state_name.to_string(),
            })?;
        Ok(build_frame_sequence(target.as_ref(), &state, params))
    }

    /// 中断当前过渡
    ///
    /// 当前解释器在下一帧开头停止并调用完成回调，随后队列中的下一个
    /// 请求开始播放。`unsafe_stop` 为 true 时先清空队列。
    pub fn interrupt(&self, unsafe_stop: bool) {
        let mut core = self.shared.core.lock();
        if unsafe_stop {
            core.pending.clear();
        }
        if core.starting {
            core.stop_on_start = true;
        }
        if let Some(control) = &core.current {
            control.request_stop();
            debug!(
                target = %self.shared.id,
                interpreter = control.id(),
                unsafe_stop,
                pending = core.pending.len(),
                "请求中断过渡"
            );
        }
    }

    /// 清空排队中的请求（不影响正在播放的过渡）
    pub fn clear_queue(&self) -> usize {
        let mut core = self.shared.core.lock();
        let cleared = core.pending.len();
        core.pending.clear();
        cleared
    }

    /// 释放调度器
    ///
    /// 当前解释器静默退出（不调用完成回调），队列被清空。
    pub fn dispose(&self) {
        let mut core = self.shared.core.lock();
        core.pending.clear();
        core.current_state = None;
        core.generation += 1;
        if let Some(control) = core.current.take() {
            control.request_reset();
            core.draining = Some(control.id());
            debug!(target = %self.shared.id, interpreter = control.id(), "释放调度器");
        }
        self.shared.publish_idle(&core);
    }

    // ========== 查询 ==========

    /// 当前状态
    pub fn phase(&self) -> SchedulerPhase {
        self.shared.core.lock().phase()
    }

    /// 是否有解释器在播放
    pub fn is_running(&self) -> bool {
        self.shared.core.lock().phase() == SchedulerPhase::Running
    }

    /// 排队中的请求数量
    pub fn pending_len(&self) -> usize {
        self.shared.core.lock().pending.len()
    }

    /// 最近一次开始播放的状态名
    pub fn current_state_name(&self) -> Option<String> {
        self.shared.core.lock().current_state.clone()
    }

    /// 等待调度器回到 Idle
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.idle.subscribe();
        // Sender 与调度器同生命周期，这里不会返回错误
        let _ = rx.wait_for(|idle| *idle).await;
    }
}

/// 播放任务守卫
///
/// 任务正常结束或因 panic 被丢弃时都会通知调度器。
struct PlaybackGuard {
    shared: Arc<SchedulerShared>,
    interpreter_id: u64,
    outcome: Option<PlaybackOutcome>,
}

impl Drop for PlaybackGuard {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or_else(|| {
            warn!(
                target = %self.shared.id,
                interpreter = self.interpreter_id,
                "播放任务异常退出"
            );
            PlaybackOutcome::Aborted
        });
        self.shared.finish(self.interpreter_id, outcome);
    }
}

impl SchedulerShared {
    /// 启动请求
    ///
    /// 调用前已在锁内通过 `begin_start` 占位；帧序列在锁外构建。
    /// 状态已被移除时跳过该请求，继续尝试队列中的下一个。
    fn launch(self: &Arc<Self>, mut request: PendingTransition, generation: u64) {
        loop {
            let Some(target) = self.target.upgrade() else {
                let mut core = self.core.lock();
                core.starting = false;
                core.pending.clear();
                self.publish_idle(&core);
                return;
            };

            let frames = match request.frames.take() {
                Some(frames) => Some(frames),
                None => {
                    let definition = self.core.lock().states.get(&request.state).cloned();
                    definition.map(|definition| {
                        build_frame_sequence(target.as_ref(), &definition, &request.params)
                    })
                }
            };

            let mut core = self.core.lock();
            if core.generation != generation {
                trace!(target = %self.id, state = %request.state, "请求已随调度器释放");
                core.starting = false;
                self.publish_idle(&core);
                return;
            }

            let Some(frames) = frames else {
                debug!(target = %self.id, state = %request.state, "状态已被移除，跳过请求");
                let next = core.pending.pop_front();
                match next {
                    Some(next) => {
                        drop(core);
                        request = next;
                        continue;
                    }
                    None => {
                        core.starting = false;
                        self.publish_idle(&core);
                        return;
                    }
                }
            };

            core.starting = false;
            let task = self.start_locked(&mut core, &target, request.state, request.params, frames);
            self.publish_idle(&core);
            drop(core);

            // 运行时关闭时 spawn 会就地丢弃任务并触发守卫，必须在锁外调用
            self.context.spawn(task);
            return;
        }
    }

    /// 创建解释器，返回待 spawn 的播放任务
    fn start_locked(
        self: &Arc<Self>,
        core: &mut SchedulerCore,
        target: &Arc<dyn AnimationTarget>,
        state: String,
        params: TransitionParams,
        frames: FrameSequence,
    ) -> impl Future<Output = ()> + Send + use<> {
        let mut interpreter = TransitionInterpreter::new(target, params, frames);
        let control = interpreter.control();
        let interpreter_id = control.id();
        if std::mem::take(&mut core.stop_on_start) {
            control.request_stop();
        }
        core.current = Some(control);
        core.current_state = Some(state.clone());

        debug!(
            target = %self.id,
            state = %state,
            interpreter = interpreter_id,
            "开始过渡"
        );

        let mut guard = PlaybackGuard {
            shared: Arc::clone(self),
            interpreter_id,
            outcome: None,
        };
        async move {
            let _ = &guard;
            guard.outcome = Some(interpreter.run().await);
        }
    }

    /// 解释器退出后的收尾
    fn finish(self: &Arc<Self>, interpreter_id: u64, outcome: PlaybackOutcome) {
        let mut core = self.core.lock();

        if core.draining == Some(interpreter_id) {
            core.draining = None;
        }

        if core.current.as_ref().map(|c| c.id()) != Some(interpreter_id) {
            trace!(target = %self.id, interpreter = interpreter_id, "解释器已被取代");
            self.publish_idle(&core);
            return;
        }
        core.current = None;

        if outcome == PlaybackOutcome::Reset {
            core.pending.clear();
        }

        let Some(next) = core.pending.pop_front() else {
            self.publish_idle(&core);
            return;
        };
        let generation = core.begin_start();
        drop(core);

        self.launch(next, generation);
    }

    fn publish_idle(&self, core: &SchedulerCore) {
        let idle = core.phase() == SchedulerPhase::Idle;
        self.idle.send_if_modified(|value| {
            let changed = *value != idle;
            *value = idle;
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{Animatable, PropertyTable};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Lamp {
        brightness: Mutex<f64>,
    }

    impl Animatable for Lamp {
        fn describe(props: &mut PropertyTable<Self>) {
            props.number(
                "brightness",
                |l| *l.brightness.lock(),
                |l, v| *l.brightness.lock() = v,
            );
        }
    }

    fn scheduler() -> (Arc<Lamp>, TransitionScheduler) {
        let lamp = Arc::new(Lamp::default());
        let context = UiContext::current().unwrap();
        let scheduler = TransitionScheduler::with_context(lamp.clone(), context);
        scheduler.add_state(State::new("on").with("brightness", 1.0));
        scheduler.add_state(State::new("off").with("brightness", 0.0));
        (lamp, scheduler)
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_unknown_state() {
        let (_lamp, scheduler) = scheduler();
        let err = scheduler
            .enqueue("dim", TransitionParams::new(0.1), None)
            .unwrap_err();
        assert_eq!(err, TransitionError::UnknownState { name: "dim".to_string() });
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_invalid_params() {
        let (_lamp, scheduler) = scheduler();
        let result = scheduler.enqueue("on", TransitionParams::new(-0.5), None);
        assert!(matches!(result, Err(TransitionError::InvalidDuration { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_target() {
        let (lamp, scheduler) = scheduler();
        drop(lamp);
        assert_eq!(
            scheduler.enqueue("on", TransitionParams::new(0.1), None),
            Err(TransitionError::MissingTarget)
        );
        assert!(scheduler.preload("on", &TransitionParams::new(0.1)).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_then_queue() {
        let (lamp, scheduler) = scheduler();
        let params = TransitionParams::new(0.2).with_frame_rate(10);

        scheduler.enqueue("on", params.clone(), None).unwrap();
        assert!(scheduler.is_running());
        assert_eq!(scheduler.pending_len(), 0);

        scheduler.enqueue("off", params, None).unwrap();
        assert_eq!(scheduler.pending_len(), 1);

        scheduler.wait_idle().await;
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
        assert_eq!(*lamp.brightness.lock(), 0.0);
        assert_eq!(scheduler.current_state_name().as_deref(), Some("off"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_preload_is_used() {
        let (lamp, scheduler) = scheduler();
        let params = TransitionParams::new(0.3).with_frame_rate(10);
        let frames = scheduler.preload("on", &params).unwrap();
        assert_eq!(frames.frame_count(), 3);

        scheduler.enqueue("on", params, Some(frames)).unwrap();
        scheduler.wait_idle().await;
        assert_eq!(*lamp.brightness.lock(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_is_silent() {
        let (lamp, scheduler) = scheduler();
        let completed = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&completed);
        let params = TransitionParams::new(1.0)
            .with_frame_rate(10)
            .on_completed(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });

        scheduler.enqueue("on", params.clone(), None).unwrap();
        scheduler.enqueue("off", params, None).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;

        scheduler.dispose();
        assert_eq!(scheduler.pending_len(), 0);
        assert!(!scheduler.is_running());

        scheduler.wait_idle().await;
        let brightness = *lamp.brightness.lock();
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;

        assert_eq!(completed.load(Ordering::SeqCst), 0);
        assert_eq!(*lamp.brightness.lock(), brightness);
        assert!(brightness < 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_queue() {
        let (_lamp, scheduler) = scheduler();
        let params = TransitionParams::new(0.5).with_frame_rate(10);
        scheduler.enqueue("on", params.clone(), None).unwrap();
        scheduler.enqueue("off", params.clone(), None).unwrap();
        scheduler.enqueue("on", params, None).unwrap();

        assert_eq!(scheduler.clear_queue(), 2);
        assert_eq!(scheduler.pending_len(), 0);
        assert!(scheduler.is_running());
        scheduler.wait_idle().await;
        assert_eq!(scheduler.current_state_name().as_deref(), Some("on"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_management() {
        let (_lamp, scheduler) = scheduler();
        assert_eq!(scheduler.state_names(), vec!["off".to_string(), "on".to_string()]);

        assert!(scheduler.remove_state("off").is_some());
        assert!(scheduler.state("off").is_none());
        assert!(scheduler.state("on").is_some());
    }
}
