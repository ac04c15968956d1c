/*
 * 元数据与统计报表
 * 所有表都带表头，列顺序固定，下游工具按位置读取：
 *   元数据:           Name, <类别1>, <类别2>, ...（类别按首次出现顺序，缺省特征为空）
 *   特征频率:         Type, Name, Frequency
 *   特征数量频率:     Count, Frequency
 *   稀有度分数:       Name, Rarity Score
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::sampler::GeneratedSet;
use super::statistics::CollectionStatistics;
use super::trait_table::category_label;
use crate::core::Result;

pub const TRAIT_FREQUENCY_HEADER: [&str; 3] = ["Type", "Name", "Frequency"];
pub const TRAIT_COUNT_HEADER: [&str; 2] = ["Count", "Frequency"];
pub const RARITY_SCORE_HEADER: [&str; 2] = ["Name", "Rarity Score"];

/// 生成记录，保存实际使用的种子以便复现
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub token_name: String,
    pub amount: usize,
    pub seed: u64,
    pub source_table: PathBuf,
    pub categories: Vec<Option<String>>,
    pub generated_at: DateTime<Utc>,
    pub generator_version: String,
}

pub fn write_metadata(path: &Path, token_name: &str, set: &GeneratedSet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["Name"];
    header.extend(set.categories().iter().map(|c| category_label(c.as_deref())));
    writer.write_record(&header)?;

    for item in set.items() {
        let mut record = vec![item.display_name(token_name)];
        record.extend(item.names.iter().map(|name| name.clone().unwrap_or_default()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    debug!("元数据已写入: {}", path.display());
    Ok(())
}

pub fn write_trait_frequencies(path: &Path, statistics: &CollectionStatistics) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(TRAIT_FREQUENCY_HEADER)?;

    for ((category, name), frequency) in &statistics.trait_frequencies {
        writer.write_record([category.clone(), name.clone(), frequency.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_trait_count_frequencies(path: &Path, statistics: &CollectionStatistics) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(TRAIT_COUNT_HEADER)?;

    for (count, frequency) in &statistics.trait_count_frequencies {
        writer.write_record([count.to_string(), frequency.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_rarity_scores(
    path: &Path,
    token_name: &str,
    set: &GeneratedSet,
    statistics: &CollectionStatistics,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(RARITY_SCORE_HEADER)?;

    for (item, score) in set.items().iter().zip(&statistics.rarity_scores) {
        writer.write_record([item.display_name(token_name), score.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_summary(path: &Path, summary: &GenerationSummary) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::sampler::GeneratedItem;
    use tempfile::TempDir;

    fn item(ordinal: usize, names: &[Option<&str>]) -> GeneratedItem {
        GeneratedItem {
            ordinal,
            selections: vec![0; names.len()],
            names: names.iter().map(|name| name.map(str::to_string)).collect(),
        }
    }

    fn sample_set() -> GeneratedSet {
        GeneratedSet::new(
            vec![Some("Background".to_string()), Some("Mouth".to_string())],
            vec![
                item(1, &[Some("Green"), Some("Smile")]),
                item(2, &[Some("Blue"), None]),
            ],
        )
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path).unwrap();
        reader
            .records()
            .map(|record| record.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_metadata_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.csv");
        write_metadata(&path, "Cat", &sample_set()).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows[0], vec!["Name", "Background", "Mouth"]);
        assert_eq!(rows[1], vec!["Cat #1", "Green", "Smile"]);
        assert_eq!(rows[2], vec!["Cat #2", "Blue", ""]);
    }

    #[test]
    fn test_statistics_tables() {
        let dir = TempDir::new().unwrap();
        let set = sample_set();
        let statistics = CollectionStatistics::compute(&set);

        let frequencies = dir.path().join("trait_frequencies.csv");
        write_trait_frequencies(&frequencies, &statistics).unwrap();
        let rows = read_rows(&frequencies);
        assert_eq!(rows[0], vec!["Type", "Name", "Frequency"]);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], vec!["Background", "Blue", "1"]);

        let counts = dir.path().join("trait_count_frequencies.csv");
        write_trait_count_frequencies(&counts, &statistics).unwrap();
        assert_eq!(
            read_rows(&counts),
            vec![vec!["Count", "Frequency"], vec!["1", "1"], vec!["2", "1"]]
        );

        let scores = dir.path().join("rarity_scores.csv");
        write_rarity_scores(&scores, "Cat", &set, &statistics).unwrap();
        let rows = read_rows(&scores);
        assert_eq!(rows[0], vec!["Name", "Rarity Score"]);
        assert_eq!(rows[1][0], "Cat #1");
        assert_eq!(rows[2][0], "Cat #2");
        // #1: 2/1 + 2/1 + 2/1
        assert_eq!(rows[1][1].parse::<f64>().unwrap(), 6.0);
    }

    #[test]
    fn test_summary_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("generation.json");
        let summary = GenerationSummary {
            token_name: "Cat".to_string(),
            amount: 2,
            seed: 42,
            source_table: PathBuf::from("traits.csv"),
            categories: vec![Some("Background".to_string()), None],
            generated_at: Utc::now(),
            generator_version: crate::VERSION.to_string(),
        };

        write_summary(&path, &summary).unwrap();
        let loaded: GenerationSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, summary);
    }
}
