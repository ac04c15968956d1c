/*
 * 藏品生成引擎
 * 特征表 → 权重归一化 → 组合采样 → (统计, 合成, 元数据)
 * 所有输出先写入暂存目录，全部成功后再提交
 */

use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use log::{info, warn};

pub mod compositor;
pub mod output;
pub mod report;
pub mod sampler;
pub mod statistics;
pub mod trait_table;
pub mod weights;

pub use compositor::Compositor;
pub use output::StagedOutput;
pub use report::GenerationSummary;
pub use sampler::{CombinationSampler, GeneratedItem, GeneratedSet};
pub use statistics::CollectionStatistics;
pub use trait_table::{TraitRow, TraitTable};
pub use weights::{NormalizedGroup, NormalizedGroups};

use crate::core::{ConfigManager, GenerationError, GeneratorConfig, Result};
use crate::profile;
use crate::utils::RandomGenerator;

/// 一次生成的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub token_name: String,
    pub amount: usize,
    pub seed: Option<u64>,
}

impl GenerationRequest {
    pub fn new(token_name: impl Into<String>, amount: usize) -> Self {
        Self { token_name: token_name.into(), amount, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        let name = self.token_name.trim();
        if name.is_empty() {
            return Err(GenerationError::Config("token name must not be empty".to_string()));
        }
        if self.token_name.contains(['/', '\\']) {
            return Err(GenerationError::Config(format!(
                "token name must not contain path separators: {}",
                self.token_name
            )));
        }
        if self.amount == 0 {
            return Err(GenerationError::InvalidAmount);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    pub seed: u64,
    pub set: GeneratedSet,
    pub statistics: CollectionStatistics,
}

#[derive(Debug, Clone)]
pub struct CollectionEngine {
    config: GeneratorConfig,
}

impl CollectionEngine {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        ConfigManager::validate_config(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// 在内存中完成归一化、采样与统计
    pub fn plan(
        &self,
        table: &TraitTable,
        amount: usize,
        rng: &mut RandomGenerator,
    ) -> Result<(GeneratedSet, CollectionStatistics)> {
        let groups = profile!("normalize", { NormalizedGroups::from_table(table)? });
        let sampler = CombinationSampler::new(table, &groups)?;
        let set = profile!("sample", { sampler.sample(amount, rng)? });
        let statistics = profile!("statistics", { CollectionStatistics::compute(&set) });
        Ok((set, statistics))
    }

    /// 完整生成：加载特征表并把藏品写入 `out_dir` 下的新目录
    pub fn generate(
        &self,
        request: &GenerationRequest,
        table_path: &Path,
        out_dir: &Path,
    ) -> Result<GenerationReport> {
        request.validate()?;

        let table = profile!("load", { TraitTable::load(table_path)? });
        let mut rng = RandomGenerator::from_optional_seed(request.seed);
        if request.seed.is_none() {
            warn!("未指定种子，使用随机种子 {}", rng.seed());
        }
        info!("生成 {} 个藏品 '{}', 种子 {}", request.amount, request.token_name, rng.seed());

        let (set, statistics) = self.plan(&table, request.amount, &mut rng)?;

        let collection_name =
            output::collection_dir_name(&request.token_name, &self.config, Local::now());
        let staged = StagedOutput::create(out_dir, &collection_name)?;
        self.write_collection(staged.path(), request, &table, &set, &statistics, rng.seed())?;
        let output_dir = staged.commit()?;

        Ok(GenerationReport { output_dir, seed: rng.seed(), set, statistics })
    }

    fn write_collection(
        &self,
        dir: &Path,
        request: &GenerationRequest,
        table: &TraitTable,
        set: &GeneratedSet,
        statistics: &CollectionStatistics,
        seed: u64,
    ) -> Result<()> {
        let output = &self.config.output;
        let token_name = request.token_name.as_str();

        report::write_metadata(&dir.join(&output.metadata_file), token_name, set)?;

        let statistics_dir = dir.join(&output.statistics_dir);
        std::fs::create_dir(&statistics_dir)?;
        report::write_trait_frequencies(&statistics_dir.join(&output.trait_frequencies_file), statistics)?;
        report::write_trait_count_frequencies(
            &statistics_dir.join(&output.trait_count_frequencies_file),
            statistics,
        )?;
        report::write_rarity_scores(
            &statistics_dir.join(&output.rarity_scores_file),
            token_name,
            set,
            statistics,
        )?;

        let compositor = Compositor::new(table, token_name);
        profile!("render", {
            for item in set.items() {
                let image = compositor.render(item)?;
                image.save(dir.join(compositor.file_name(item)))?;
            }
        });
        info!("已保存 {} 张图像", set.len());

        let summary = GenerationSummary {
            token_name: token_name.to_string(),
            amount: set.len(),
            seed,
            source_table: table.source().to_path_buf(),
            categories: set.categories().to_vec(),
            generated_at: Utc::now(),
            generator_version: crate::VERSION.to_string(),
        };
        report::write_summary(&dir.join(&output.summary_file), &summary)?;

        Ok(())
    }
}
