/*
 * 稀有度统计
 * 1. 特征频率：每个 (类别, 名称) 在全部藏品中出现的次数，缺省特征不计
 * 2. 特征数量频率：每个藏品有特征名的槽位数的分布（缺省类别下的具名特征也计入）
 * 3. 稀有度分数：Σ amount/槽位频率 + amount/特征数量频率
 */

use std::collections::BTreeMap;

use log::info;

use super::sampler::GeneratedSet;

/// (类别, 名称)
pub type TraitKey = (String, String);

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStatistics {
    pub trait_frequencies: BTreeMap<TraitKey, usize>,
    pub trait_count_frequencies: BTreeMap<usize, usize>,
    /// 与藏品顺序一致
    pub rarity_scores: Vec<f64>,
}

impl CollectionStatistics {
    pub fn compute(set: &GeneratedSet) -> Self {
        let trait_frequencies = trait_frequencies(set);
        let counts = trait_counts(set);
        let trait_count_frequencies = tabulate_counts(&counts);
        let rarity_scores = rarity_scores(set, &trait_frequencies, &trait_count_frequencies);

        info!(
            "统计完成: {} 个不同特征, {} 种特征数量",
            trait_frequencies.len(),
            trait_count_frequencies.len()
        );

        Self { trait_frequencies, trait_count_frequencies, rarity_scores }
    }
}

/// 藏品每个非缺省槽位的 (类别, 名称)
fn present_traits<'s>(
    set: &'s GeneratedSet,
    names: &'s [Option<String>],
) -> impl Iterator<Item = (&'s str, &'s str)> + 's {
    set.categories()
        .iter()
        .zip(names)
        .filter_map(|(category, name)| Some((category.as_deref()?, name.as_deref()?)))
}

pub fn trait_frequencies(set: &GeneratedSet) -> BTreeMap<TraitKey, usize> {
    let mut frequencies = BTreeMap::new();
    for item in set.items() {
        for (category, name) in present_traits(set, &item.names) {
            *frequencies
                .entry((category.to_string(), name.to_string()))
                .or_insert(0) += 1;
        }
    }
    frequencies
}

/// 有特征名的槽位数
pub fn trait_count(names: &[Option<String>]) -> usize {
    names.iter().filter(|name| name.is_some()).count()
}

pub fn trait_counts(set: &GeneratedSet) -> Vec<usize> {
    set.items().iter().map(|item| trait_count(&item.names)).collect()
}

pub fn tabulate_counts(counts: &[usize]) -> BTreeMap<usize, usize> {
    let mut frequencies = BTreeMap::new();
    for &count in counts {
        *frequencies.entry(count).or_insert(0) += 1;
    }
    frequencies
}

pub fn rarity_scores(
    set: &GeneratedSet,
    trait_frequencies: &BTreeMap<TraitKey, usize>,
    trait_count_frequencies: &BTreeMap<usize, usize>,
) -> Vec<f64> {
    let amount = set.len();

    set.items()
        .iter()
        .map(|item| {
            let slot_frequencies: Vec<usize> = present_traits(set, &item.names)
                .filter_map(|(category, name)| {
                    trait_frequencies
                        .get(&(category.to_string(), name.to_string()))
                        .copied()
                })
                .collect();
            let count = trait_count(&item.names);
            let count_frequency = trait_count_frequencies.get(&count).copied().unwrap_or(amount);
            rarity_score(amount, &slot_frequencies, count_frequency)
        })
        .collect()
}

/// 单个藏品的分数；频率均来自同一批藏品，因此不会为零
pub fn rarity_score(amount: usize, slot_frequencies: &[usize], count_frequency: usize) -> f64 {
    let amount = amount as f64;
    slot_frequencies
        .iter()
        .chain(std::iter::once(&count_frequency))
        .map(|&frequency| amount / frequency.max(1) as f64)
        .sum()
}
