// 核心模块 - 错误类型与配置管理

pub mod error;
pub mod config;

// 重新导出核心类型
pub use error::{GenerationError, Result};
pub use config::{ConfigManager, GeneralConfig, GeneratorConfig, OutputConfig};
