//! 集成测试共用的可动画目标

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use transition_runtime::{Animatable, AnimationTarget, Color, PropertyTable};

/// 记录每次写入的测试目标
#[derive(Default)]
pub struct Widget {
    pub value: Mutex<f64>,
    pub fill: Mutex<Color>,
    pub writes: Mutex<Vec<f64>>,
}

impl Widget {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn value(&self) -> f64 {
        *self.value.lock()
    }

    pub fn writes(&self) -> Vec<f64> {
        self.writes.lock().clone()
    }
}

impl Animatable for Widget {
    fn describe(props: &mut PropertyTable<Self>) {
        props
            .number(
                "value",
                |w| *w.value.lock(),
                |w, v| {
                    *w.value.lock() = v;
                    w.writes.lock().push(v);
                },
            )
            .color("fill", |w| *w.fill.lock(), |w, v| *w.fill.lock() = v);
    }
}

/// 以 trait object 形式返回
pub fn as_target(widget: &Arc<Widget>) -> Arc<dyn AnimationTarget> {
    widget.clone()
}

/// 线程安全的事件记录
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn recorder(&self, event: &'static str) -> impl Fn() + Send + Sync + 'static {
        let log = self.clone();
        move || log.push(event)
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == event).count()
    }
}
