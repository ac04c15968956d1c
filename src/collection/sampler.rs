/*
 * 组合采样器
 * 1. 每个类别按其概率分布独立抽取一行
 * 2. 以类别顺序下的特征名元组判重，重复则丢弃重抽
 * 3. 采样前先检查组合空间，数量不足时立即失败
 * 4. 相同种子产生完全相同的结果（包括顺序）
 */

use std::collections::HashSet;

use log::{debug, info};
use rand::distributions::WeightedIndex;

use super::trait_table::TraitTable;
use super::weights::{describe_category, NormalizedGroups};
use crate::core::{GenerationError, Result};
use crate::utils::RandomGenerator;

/// 一个生成的藏品：每个类别恰好选中一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedItem {
    /// 从1开始的序号
    pub ordinal: usize,
    /// 选中的行下标，按类别首次出现顺序
    pub selections: Vec<usize>,
    /// 与 `selections` 对应的特征名
    pub names: Vec<Option<String>>,
}

impl GeneratedItem {
    pub fn display_name(&self, token_name: &str) -> String {
        format!("{} #{}", token_name, self.ordinal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSet {
    categories: Vec<Option<String>>,
    items: Vec<GeneratedItem>,
}

impl GeneratedSet {
    pub fn new(categories: Vec<Option<String>>, items: Vec<GeneratedItem>) -> Self {
        Self { categories, items }
    }

    pub fn categories(&self) -> &[Option<String>] {
        &self.categories
    }

    pub fn items(&self) -> &[GeneratedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct CombinationSampler<'a> {
    table: &'a TraitTable,
    groups: &'a NormalizedGroups,
    distributions: Vec<WeightedIndex<f64>>,
}

impl<'a> CombinationSampler<'a> {
    pub fn new(table: &'a TraitTable, groups: &'a NormalizedGroups) -> Result<Self> {
        let distributions = groups
            .iter()
            .map(|group| {
                WeightedIndex::new(group.probabilities.iter().copied()).map_err(|_| {
                    GenerationError::DegenerateWeight {
                        category: describe_category(group.category.as_deref()),
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { table, groups, distributions })
    }

    /// 生成恰好 `amount` 个两两不同的藏品
    pub fn sample(&self, amount: usize, rng: &mut RandomGenerator) -> Result<GeneratedSet> {
        if amount == 0 {
            return Err(GenerationError::InvalidAmount);
        }

        // 组合空间溢出 u128 时视为足够大
        if let Some(available) = self.groups.combination_space(self.table) {
            if (amount as u128) > available {
                return Err(GenerationError::InsufficientCombinations { requested: amount, available });
            }
        }

        let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(amount);
        let mut items = Vec::with_capacity(amount);
        let mut rejected = 0u64;

        while items.len() < amount {
            let selections = self.draw(rng);
            let names: Vec<Option<String>> = selections
                .iter()
                .map(|&index| self.table.rows()[index].name.clone())
                .collect();

            if seen.contains(&names) {
                rejected += 1;
                continue;
            }

            seen.insert(names.clone());
            items.push(GeneratedItem { ordinal: items.len() + 1, selections, names });
            debug!("接受组合 #{}", items.len());
        }

        info!(
            "生成 {} 个唯一组合, 丢弃重复抽取 {} 次, 共抽取 {} 次",
            items.len(),
            rejected,
            rng.stats().total_generations
        );
        Ok(GeneratedSet::new(self.groups.categories(), items))
    }

    /// 每个类别独立抽取一行
    fn draw(&self, rng: &mut RandomGenerator) -> Vec<usize> {
        self.groups
            .iter()
            .zip(&self.distributions)
            .map(|(group, distribution)| group.indices[rng.weighted_index(distribution)])
            .collect()
    }
}
