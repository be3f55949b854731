//! # Error 模块
//!
//! 定义 transition-runtime 中使用的错误类型。
//!
//! 只有前置条件错误会返回给调用方；播放过程中的异常（未知属性、
//! 越界帧索引、被重置的动画）一律吸收并降级处理，不会出现在这里。

use thiserror::Error;

/// 过渡调度错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// 调度器绑定的目标对象已被释放
    #[error("过渡目标不存在或已被释放")]
    MissingTarget,

    /// 时长非法（负数或非有限值）
    #[error("无效的过渡时长: {duration}")]
    InvalidDuration { duration: f64 },

    /// 帧率非法
    #[error("无效的帧率: {frame_rate}")]
    InvalidFrameRate { frame_rate: u32 },

    /// 单轮帧数超过上限
    #[error("过渡时长 {duration} 秒超出帧数上限 {max}")]
    TooManyFrames { duration: f64, max: usize },

    /// 状态名未注册
    #[error("状态 '{name}' 未注册")]
    UnknownState { name: String },

    /// 当前线程没有可用的 UI 上下文（tokio runtime）
    #[error("当前线程没有可用的 UI 上下文")]
    NoUiContext,
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(String),

    /// 解析 / 序列化失败
    #[error("配置解析失败: {0}")]
    Parse(String),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

/// 场景文件错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// 读取失败
    #[error("场景文件读取失败: {0}")]
    Io(String),

    /// JSON 解析失败
    #[error("场景解析失败: {0}")]
    Parse(String),

    /// 播放列表引用了不存在的状态
    #[error("第 {index} 个播放项引用了未定义的状态 '{state}'")]
    UndefinedState { index: usize, state: String },

    /// 属性不存在于演示目标上
    #[error("状态 '{state}' 中的属性 '{property}' 不是可动画属性")]
    UnknownProperty { state: String, property: String },

    /// 播放参数非法
    #[error("第 {index} 个播放项参数无效: {source}")]
    InvalidParams {
        index: usize,
        #[source]
        source: TransitionError,
    },
}

/// transition-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 过渡错误
    #[error("过渡错误: {0}")]
    Transition(#[from] TransitionError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 场景错误
    #[error("场景错误: {0}")]
    Scene(#[from] SceneError),
}

/// Result 类型别名
pub type TransitionResult<T> = Result<T, TransitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: EngineError = TransitionError::MissingTarget.into();
        assert!(matches!(err, EngineError::Transition(TransitionError::MissingTarget)));

        let err: EngineError = ConfigError::Validation("x".to_string()).into();
        assert!(err.to_string().contains("配置验证失败"));
    }

    #[test]
    fn test_error_display() {
        let err = TransitionError::UnknownState {
            name: "hover".to_string(),
        };
        assert_eq!(err.to_string(), "状态 'hover' 未注册");
    }
}
