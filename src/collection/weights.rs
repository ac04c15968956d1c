/*
 * 权重归一化
 * 1. 按类别分组行下标（缺省类别自成一组）
 * 2. 组内权重除以组内总和得到概率分布
 * 3. 组按类别首次出现顺序保存，供采样与输出使用
 */

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use super::trait_table::TraitTable;
use crate::core::{GenerationError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGroup {
    pub category: Option<String>,
    /// 类别首次出现的顺序位置
    pub position: usize,
    /// 属于该类别的行下标，按文件顺序
    pub indices: Vec<usize>,
    /// 与 `indices` 一一对应，总和为1
    pub probabilities: Vec<f64>,
}

impl NormalizedGroup {
    pub fn total_probability(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// 可被抽中的不同特征名数量（权重为零的名称不计入）
    pub fn reachable_names(&self, table: &TraitTable) -> usize {
        self.indices
            .iter()
            .zip(&self.probabilities)
            .filter(|(_, p)| **p > 0.0)
            .filter_map(|(&index, _)| table.row(index))
            .map(|row| row.name.as_deref())
            .collect::<HashSet<_>>()
            .len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGroups {
    groups: IndexMap<Option<String>, NormalizedGroup>,
}

impl NormalizedGroups {
    pub fn from_table(table: &TraitTable) -> Result<Self> {
        if table.is_empty() {
            return Err(GenerationError::MalformedInput {
                path: table.source().to_path_buf(),
                reason: "trait table has no rows".to_string(),
            });
        }

        let mut grouped: IndexMap<Option<String>, Vec<usize>> = IndexMap::new();
        for (index, row) in table.rows().iter().enumerate() {
            grouped.entry(row.category.clone()).or_default().push(index);
        }

        let mut groups = IndexMap::with_capacity(grouped.len());
        for (position, (category, indices)) in grouped.into_iter().enumerate() {
            let weights: Vec<u64> = indices
                .iter()
                .filter_map(|&index| table.row(index))
                .map(|row| row.weight)
                .collect();
            // u64 权重之和可能溢出，按 u128 累加
            let total: u128 = weights.iter().map(|&weight| u128::from(weight)).sum();

            if total == 0 {
                return Err(GenerationError::DegenerateWeight {
                    category: describe_category(category.as_deref()),
                });
            }

            let probabilities = weights
                .iter()
                .map(|&weight| weight as f64 / total as f64)
                .collect();

            debug!(
                "类别 {}: {} 个特征, 总权重 {}",
                describe_category(category.as_deref()),
                indices.len(),
                total
            );

            groups.insert(
                category.clone(),
                NormalizedGroup { category, position, indices, probabilities },
            );
        }

        Ok(Self { groups })
    }

    pub fn get(&self, category: Option<&str>) -> Option<&NormalizedGroup> {
        self.groups.get(&category.map(str::to_string))
    }

    /// 按类别首次出现顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &NormalizedGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn categories(&self) -> Vec<Option<String>> {
        self.groups.keys().cloned().collect()
    }

    /// 不同组合的总数；溢出时返回 None（视为无限）
    pub fn combination_space(&self, table: &TraitTable) -> Option<u128> {
        self.iter().try_fold(1u128, |space, group| {
            space.checked_mul(group.reachable_names(table) as u128)
        })
    }
}

/// 错误与日志中使用的类别名称
pub fn describe_category(category: Option<&str>) -> String {
    match category {
        Some(name) => name.to_string(),
        None => "(no category)".to_string(),
    }
}
