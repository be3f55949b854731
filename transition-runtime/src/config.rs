//! # Config 模块
//!
//! 引擎级配置：默认帧率与帧率上限。
//!
//! ## 配置优先级
//!
//! 1. `TransitionParams` 上显式设置的帧率（最高，仍受上限约束）
//! 2. 通过 [`set_global`] 安装的全局配置
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 默认帧率（帧/秒）
    #[serde(default = "default_frame_rate")]
    pub default_frame_rate: u32,

    /// 全局帧率上限
    #[serde(default = "default_max_frame_rate")]
    pub max_frame_rate: u32,
}

fn default_frame_rate() -> u32 {
    60
}

fn default_max_frame_rate() -> u32 {
    240
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_frame_rate: default_frame_rate(),
            max_frame_rate: default_max_frame_rate(),
        }
    }
}

impl EngineConfig {
    /// 从 JSON 字符串解析配置
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置文件
    ///
    /// 文件不存在时返回默认配置；存在但无法解析时返回错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_json(&content)?;
        info!(path = ?path, "配置文件加载成功");
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_frame_rate == 0 {
            return Err(ConfigError::Validation(
                "default_frame_rate 必须大于 0".to_string(),
            ));
        }
        if self.max_frame_rate == 0 {
            return Err(ConfigError::Validation(
                "max_frame_rate 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 将帧率限制到 `[1, max_frame_rate]`
    pub fn clamp_frame_rate(&self, frame_rate: u32) -> u32 {
        frame_rate.clamp(1, self.max_frame_rate.max(1))
    }
}

static GLOBAL_CONFIG: OnceLock<RwLock<EngineConfig>> = OnceLock::new();

fn global_cell() -> &'static RwLock<EngineConfig> {
    GLOBAL_CONFIG.get_or_init(|| RwLock::new(EngineConfig::default()))
}

/// 获取当前全局配置的快照
pub fn global() -> EngineConfig {
    global_cell().read().clone()
}

/// 安装全局配置
pub fn set_global(config: EngineConfig) -> Result<(), ConfigError> {
    config.validate()?;
    *global_cell().write() = config;
    Ok(())
}
