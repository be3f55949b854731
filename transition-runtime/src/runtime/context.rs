//! # Context 模块
//!
//! UI 上下文：所有属性写入与回调都在这里执行。
//!
//! 宿主持有一个 tokio runtime；使用 current-thread runtime 时，
//! 所有播放任务都在同一个逻辑线程上协作执行。

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{TransitionError, TransitionResult};

/// UI 上下文
#[derive(Debug, Clone)]
pub struct UiContext {
    handle: Handle,
}

impl UiContext {
    /// 绑定到当前线程所在的 tokio runtime
    pub fn current() -> TransitionResult<Self> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|_| TransitionError::NoUiContext)
    }

    /// 绑定到指定的 runtime
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// 底层 runtime 句柄
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// 在 UI 上下文上启动任务（不阻塞调用方）
    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future)
    }
}
