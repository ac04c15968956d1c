// 错误处理系统
// 生成流程中所有致命错误的统一类型，每个错误都指明出错的行、类别或藏品

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    // 输入表错误
    #[error("Malformed input in {}: {reason}", .path.display())]
    MalformedInput { path: PathBuf, reason: String },

    // 图层图像错误
    #[error("Missing layer image: {}", .path.display())]
    MissingAsset { path: PathBuf },
    #[error("Unsupported layer image {}: {reason}", .path.display())]
    UnsupportedImage { path: PathBuf, reason: String },

    // 权重与组合空间
    #[error("Amount must be at least 1")]
    InvalidAmount,
    #[error("Category '{category}' has a total rarity weight of zero")]
    DegenerateWeight { category: String },
    #[error("Requested {requested} items but only {available} distinct combinations exist")]
    InsufficientCombinations { requested: usize, available: u128 },

    // 渲染错误
    #[error("Item '{item}' has no visible layers")]
    NoVisibleLayers { item: String },

    // 配置错误
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, GenerationError>;

impl From<serde_json::Error> for GenerationError {
    fn from(error: serde_json::Error) -> Self {
        GenerationError::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for GenerationError {
    fn from(error: toml::de::Error) -> Self {
        GenerationError::Config(error.to_string())
    }
}

impl From<toml::ser::Error> for GenerationError {
    fn from(error: toml::ser::Error) -> Self {
        GenerationError::Serialization(error.to_string())
    }
}

impl GenerationError {
    /// 是否由用户输入（特征表、图层、权重、数量）引起，而非运行环境
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GenerationError::MalformedInput { .. }
                | GenerationError::MissingAsset { .. }
                | GenerationError::UnsupportedImage { .. }
                | GenerationError::DegenerateWeight { .. }
                | GenerationError::InvalidAmount
                | GenerationError::InsufficientCombinations { .. }
                | GenerationError::NoVisibleLayers { .. }
                | GenerationError::Config(_)
        )
    }
}
