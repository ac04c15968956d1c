/*
 * 特征表加载器
 * 1. 读取带表头的四列CSV：类别、名称、稀有度权重、图层路径
 * 2. 图层路径相对于特征表所在目录解析，统一解码为RGBA8
 * 3. 行按文件顺序保留，重复行合法（相当于提高该特征的有效权重）
 */

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use indexmap::IndexSet;
use log::{debug, info, warn};

use crate::core::{GenerationError, Result};

/// 输入表的表头
pub const TABLE_HEADER: [&str; 4] = ["Type", "Name", "Rarity Weight", "Image Path"];

/// 特征表中的一行。类别、名称、图层均可缺省
#[derive(Debug, Clone, PartialEq)]
pub struct TraitRow {
    pub category: Option<String>,
    pub name: Option<String>,
    pub weight: u64,
    pub image_path: Option<PathBuf>,
    pub image: Option<Arc<RgbaImage>>,
}

impl TraitRow {
    pub fn new(category: Option<&str>, name: Option<&str>, weight: u64) -> Self {
        Self {
            category: category.map(str::to_string),
            name: name.map(str::to_string),
            weight,
            image_path: None,
            image: None,
        }
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>, image: Arc<RgbaImage>) -> Self {
        self.image_path = Some(path.into());
        self.image = Some(image);
        self
    }
}

/// 类别的展示名称，缺省类别显示为空串
pub fn category_label(category: Option<&str>) -> &str {
    category.unwrap_or("")
}

#[derive(Debug, Clone)]
pub struct TraitTable {
    source: PathBuf,
    rows: Vec<TraitRow>,
}

impl TraitTable {
    /// 从CSV文件加载，并解码所有引用到的图层
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// 从任意读取器解析；`source` 用于错误信息和解析相对图层路径
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| malformed(source, e.to_string()))?
            .clone();
        if headers.len() != TABLE_HEADER.len() {
            return Err(malformed(
                source,
                format!("expected {} header columns, found {}", TABLE_HEADER.len(), headers.len()),
            ));
        }
        if headers.iter().ne(TABLE_HEADER.iter().copied()) {
            warn!("特征表表头与预期不符: {:?}", headers);
        }

        let base_dir = source.parent().unwrap_or_else(|| Path::new("."));
        let mut image_cache: HashMap<PathBuf, Arc<RgbaImage>> = HashMap::new();
        let mut rows = Vec::new();

        for (index, record) in reader.records().enumerate() {
            // 表头占第1行
            let line = index + 2;
            let record = record.map_err(|e| malformed(source, format!("row {}: {}", line, e)))?;
            if record.len() != TABLE_HEADER.len() {
                return Err(malformed(
                    source,
                    format!("row {}: expected {} columns, found {}", line, TABLE_HEADER.len(), record.len()),
                ));
            }

            let weight = record[2].trim().parse::<u64>().map_err(|_| {
                malformed(source, format!("row {}: invalid rarity weight '{}'", line, &record[2]))
            })?;

            let mut row = TraitRow::new(non_empty(&record[0]), non_empty(&record[1]), weight);

            if let Some(relative) = non_empty(&record[3]) {
                let path = base_dir.join(relative);
                let image = match image_cache.get(&path) {
                    Some(image) => Arc::clone(image),
                    None => {
                        debug!("解码图层图像: {}", path.display());
                        let image = Arc::new(load_layer_image(&path)?);
                        image_cache.insert(path.clone(), Arc::clone(&image));
                        image
                    }
                };
                row = row.with_image(path, image);
            }

            rows.push(row);
        }

        let table = Self::from_rows(source, rows);
        info!(
            "加载特征表 {}: {} 行, {} 个类别, {} 张图层",
            source.display(),
            table.len(),
            table.categories().len(),
            image_cache.len()
        );
        Ok(table)
    }

    pub fn from_rows(source: impl Into<PathBuf>, rows: Vec<TraitRow>) -> Self {
        Self { source: source.into(), rows }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn rows(&self) -> &[TraitRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&TraitRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按首次出现顺序列出所有类别（包括缺省类别）
    pub fn categories(&self) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|row| row.category.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }
}

/// 以PNG解码图层并转换为RGBA8
pub fn load_layer_image(path: &Path) -> Result<RgbaImage> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => GenerationError::MissingAsset { path: path.to_path_buf() },
        _ => GenerationError::Io(e),
    })?;

    let image = image::load(BufReader::new(file), ImageFormat::Png).map_err(|e| {
        GenerationError::UnsupportedImage { path: path.to_path_buf(), reason: e.to_string() }
    })?;

    Ok(image.into_rgba8())
}

fn non_empty(cell: &str) -> Option<&str> {
    if cell.is_empty() {
        None
    } else {
        Some(cell)
    }
}

fn malformed(source: &Path, reason: String) -> GenerationError {
    GenerationError::MalformedInput { path: source.to_path_buf(), reason }
}
