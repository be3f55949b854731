//! # Pool 模块
//!
//! 进程级调度器池：目标实例 -> 调度器。
//!
//! 以目标的实例身份为键。条目只持有目标的弱引用，目标释放后条目失效；
//! 每次创建新调度器时顺带清理失效条目，池的大小随存活目标数量变化。

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use super::context::UiContext;
use super::scheduler::TransitionScheduler;
use crate::accessor::{AnimationTarget, ObjectId};
use crate::error::TransitionResult;

static POOL: OnceLock<Mutex<HashMap<ObjectId, TransitionScheduler>>> = OnceLock::new();

fn pool() -> &'static Mutex<HashMap<ObjectId, TransitionScheduler>> {
    POOL.get_or_init(|| Mutex::new(HashMap::new()))
}

/// 获取目标的调度器，不存在时在当前 UI 上下文上创建
pub fn scheduler_for(target: Arc<dyn AnimationTarget>) -> TransitionResult<TransitionScheduler> {
    let id = ObjectId::of(&target);
    let mut pool = pool().lock();

    // 条目的弱引用使地址在条目存在期间不会被复用，命中即为同一实例
    if let Some(existing) = pool.get(&id) {
        return Ok(existing.clone());
    }

    let scheduler = TransitionScheduler::with_context(target, UiContext::current()?);
    let before = pool.len();
    pool.retain(|_, entry| entry.target().is_some());
    let pruned = before - pool.len();
    pool.insert(id, scheduler.clone());
    debug!(target = %id, pooled = pool.len(), pruned, "创建调度器");
    Ok(scheduler)
}

/// 移除目标已释放的条目，返回移除数量
pub fn prune() -> usize {
    let mut pool = pool().lock();
    let before = pool.len();
    pool.retain(|_, scheduler| scheduler.target().is_some());
    before - pool.len()
}

/// 池中的调度器数量
pub fn pooled_count() -> usize {
    pool().lock().len()
}
