/*
* 生成器配置：
* 1. 日志级别与输出目录的时间戳格式
* 2. 输出文件布局（元数据表、统计目录及各统计表文件名）
* 3. 从TOML文件加载、保存与校验
*/

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use chrono::format::{Item, StrftimeItems};
use log::{debug, info};

use crate::core::error::{GenerationError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub general: GeneralConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    /// 藏品目录名中时间戳的chrono格式
    pub timestamp_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub timestamped_directory: bool,
    pub metadata_file: String,
    pub statistics_dir: String,
    pub trait_frequencies_file: String,
    pub trait_count_frequencies_file: String,
    pub rarity_scores_file: String,
    pub summary_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            timestamp_format: "%Y-%m-%d %H-%M-%S%.6f".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            timestamped_directory: true,
            metadata_file: "metadata.csv".to_string(),
            statistics_dir: "statistics".to_string(),
            trait_frequencies_file: "trait_frequencies.csv".to_string(),
            trait_count_frequencies_file: "trait_count_frequencies.csv".to_string(),
            rarity_scores_file: "rarity_scores.csv".to_string(),
            summary_file: "generation.json".to_string(),
        }
    }
}

pub struct ConfigManager;

impl ConfigManager {
    /// 加载配置文件；文件不存在时写出默认配置
    pub fn load_from_file(path: &Path) -> Result<GeneratorConfig> {
        if !path.exists() {
            info!("配置文件不存在，创建默认配置: {:?}", path);
            let default_config = GeneratorConfig::default();
            Self::save_config_to_file(&default_config, path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path)?;
        let config: GeneratorConfig = toml::from_str(&content).map_err(|e| {
            GenerationError::Config(format!("解析配置文件失败 {}: {}", path.display(), e))
        })?;

        Self::validate_config(&config)?;
        info!("成功加载配置文件: {:?}", path);
        Ok(config)
    }

    pub fn save_config_to_file(config: &GeneratorConfig, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(config)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        debug!("配置已保存到: {:?}", path);
        Ok(())
    }

    pub fn validate_config(config: &GeneratorConfig) -> Result<()> {
        if config.general.timestamp_format.trim().is_empty() {
            return Err(GenerationError::Config("时间戳格式不能为空".to_string()));
        }
        if StrftimeItems::new(&config.general.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(GenerationError::Config(format!(
                "无效的时间戳格式: {}",
                config.general.timestamp_format
            )));
        }

        let output = &config.output;
        let file_names = [
            ("metadata_file", &output.metadata_file),
            ("statistics_dir", &output.statistics_dir),
            ("trait_frequencies_file", &output.trait_frequencies_file),
            ("trait_count_frequencies_file", &output.trait_count_frequencies_file),
            ("rarity_scores_file", &output.rarity_scores_file),
            ("summary_file", &output.summary_file),
        ];

        for (key, name) in file_names {
            if name.trim().is_empty() {
                return Err(GenerationError::Config(format!("{} 不能为空", key)));
            }
            if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
                return Err(GenerationError::Config(format!(
                    "{} 必须是单个文件名: {}",
                    key, name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.output.metadata_file, "metadata.csv");
        assert_eq!(config.output.statistics_dir, "statistics");
        assert_eq!(config.general.log_level, "info");
        assert!(config.output.timestamped_directory);
    }

    #[test]
    fn test_config_serialization() {
        let config = GeneratorConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: GeneratorConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GeneratorConfig = toml::from_str("[output]\nmetadata_file = \"items.csv\"\n").unwrap();
        assert_eq!(config.output.metadata_file, "items.csv");
        assert_eq!(config.output.rarity_scores_file, "rarity_scores.csv");
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_config_validation() {
        let mut config = GeneratorConfig::default();
        assert!(ConfigManager::validate_config(&config).is_ok());

        config.general.timestamp_format = "%Q".to_string();
        assert!(ConfigManager::validate_config(&config).is_err());
        config.general.timestamp_format = "%Y".to_string();

        config.output.statistics_dir = "../stats".to_string();
        assert!(ConfigManager::validate_config(&config).is_err());

        config.output.statistics_dir = String::new();
        assert!(ConfigManager::validate_config(&config).is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("traitmint.toml");

        // 不存在时写出默认配置
        let created = ConfigManager::load_from_file(&config_path).unwrap();
        assert!(config_path.exists());
        assert_eq!(created, GeneratorConfig::default());

        let mut config = GeneratorConfig::default();
        config.output.timestamped_directory = false;
        ConfigManager::save_config_to_file(&config, &config_path).unwrap();

        let loaded_config = ConfigManager::load_from_file(&config_path).unwrap();
        assert!(!loaded_config.output.timestamped_directory);
    }
}
