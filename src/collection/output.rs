// 暂存输出目录
// 所有文件先写入输出目录下的临时目录，全部成功后再整体重命名为最终目录；
// 失败时临时目录随 TempDir 析构被删除，不会留下不完整的藏品目录

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{debug, info};
use tempfile::TempDir;

use crate::core::{GeneratorConfig, Result};

pub struct StagedOutput {
    staging: TempDir,
    final_path: PathBuf,
}

impl StagedOutput {
    pub fn create(out_dir: &Path, collection_name: &str) -> Result<Self> {
        fs::create_dir_all(out_dir)?;

        let final_path = out_dir.join(collection_name);
        if final_path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("output directory already exists: {}", final_path.display()),
            )
            .into());
        }

        let staging = tempfile::Builder::new().prefix(".staging-").tempdir_in(out_dir)?;
        debug!("暂存目录: {}", staging.path().display());
        Ok(Self { staging, final_path })
    }

    /// 暂存目录，生成期间所有文件写到这里
    pub fn path(&self) -> &Path {
        self.staging.path()
    }

    /// 重命名为最终目录
    pub fn commit(self) -> Result<PathBuf> {
        let staged = self.staging.keep();
        if let Err(e) = fs::rename(&staged, &self.final_path) {
            let _ = fs::remove_dir_all(&staged);
            return Err(e.into());
        }

        info!("藏品已写入: {}", self.final_path.display());
        Ok(self.final_path)
    }
}

/// 藏品目录名：`{token_name} {时间戳}`，或关闭时间戳时仅 `{token_name}`
pub fn collection_dir_name(token_name: &str, config: &GeneratorConfig, now: DateTime<Local>) -> String {
    if config.output.timestamped_directory {
        format!("{} {}", token_name, now.format(&config.general.timestamp_format))
    } else {
        token_name.to_string()
    }
}
