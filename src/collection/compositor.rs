//! 图层合成
//!
//! 按类别首次出现顺序把藏品选中的图层逐层叠加（source-over alpha混合）。
//! 没有图层的槽位直接跳过；画布尺寸取第一个可见图层，后续图层超出部分被裁剪。

use image::{Rgba, RgbaImage};
use log::debug;

use super::sampler::GeneratedItem;
use super::trait_table::TraitTable;
use crate::core::{GenerationError, Result};

/// 藏品图像合成器
pub struct Compositor<'a> {
    table: &'a TraitTable,
    token_name: &'a str,
}

impl<'a> Compositor<'a> {
    pub fn new(table: &'a TraitTable, token_name: &'a str) -> Self {
        Self { table, token_name }
    }

    /// 渲染单个藏品
    pub fn render(&self, item: &GeneratedItem) -> Result<RgbaImage> {
        let layers = item
            .selections
            .iter()
            .filter_map(|&index| self.table.row(index))
            .filter_map(|row| row.image.as_deref());

        composite_layers(layers).ok_or_else(|| GenerationError::NoVisibleLayers {
            item: item.display_name(self.token_name),
        })
    }

    /// 输出文件名，与元数据 `Name` 列一致
    pub fn file_name(&self, item: &GeneratedItem) -> String {
        format!("{}.png", item.display_name(self.token_name))
    }
}

/// 依次叠加所有图层；没有图层时返回 None
pub fn composite_layers<'i>(layers: impl IntoIterator<Item = &'i RgbaImage>) -> Option<RgbaImage> {
    let mut layers = layers.into_iter();
    let mut canvas = layers.next()?.clone();

    for layer in layers {
        if layer.dimensions() != canvas.dimensions() {
            debug!(
                "图层尺寸 {:?} 与画布 {:?} 不一致，超出部分裁剪",
                layer.dimensions(),
                canvas.dimensions()
            );
        }
        blend_over(&mut canvas, layer);
    }

    Some(canvas)
}

/// 将 `src` 从左上角对齐叠加到 `dst` 上
pub fn blend_over(dst: &mut RgbaImage, src: &RgbaImage) {
    let width = dst.width().min(src.width());
    let height = dst.height().min(src.height());

    for y in 0..height {
        for x in 0..width {
            let below = dst.get_pixel(x, y).0;
            let above = src.get_pixel(x, y).0;
            dst.put_pixel(x, y, Rgba(blend_pixel(above, below)));
        }
    }
}

/// 非预乘RGBA的 source-over 混合
pub fn blend_pixel(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let src_a = src[3] as f32 / 255.0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    let blend = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    [
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::trait_table::TraitRow;
    use std::sync::Arc;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    fn item(selections: Vec<usize>) -> GeneratedItem {
        GeneratedItem { ordinal: 1, names: vec![None; selections.len()], selections }
    }

    #[test]
    fn test_opaque_top_layer_wins() {
        let red = solid(1, 1, RED);
        let blue = solid(1, 1, BLUE);

        let result = composite_layers([&red, &blue]).unwrap();
        assert_eq!(result.get_pixel(0, 0).0, BLUE);
    }

    #[test]
    fn test_absent_layer_leaves_other_unchanged() {
        let table = TraitTable::from_rows(
            "traits.csv",
            vec![
                TraitRow::new(Some("Background"), Some("Red"), 1)
                    .with_image("red.png", Arc::new(solid(2, 2, RED))),
                TraitRow::new(Some("Hat"), None, 1),
            ],
        );
        let compositor = Compositor::new(&table, "Cat");

        let image = compositor.render(&item(vec![0, 1])).unwrap();
        assert_eq!(image, solid(2, 2, RED));
    }

    #[test]
    fn test_no_visible_layers() {
        let table = TraitTable::from_rows(
            "traits.csv",
            vec![TraitRow::new(Some("Hat"), None, 1)],
        );
        let compositor = Compositor::new(&table, "Cat");

        match compositor.render(&item(vec![0])) {
            Err(GenerationError::NoVisibleLayers { item }) => assert_eq!(item, "Cat #1"),
            other => panic!("Expected NoVisibleLayers, got {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[test]
    fn test_translucent_blend() {
        // 半透明蓝叠在不透明红上
        let result = blend_pixel([0, 0, 255, 128], RED);
        assert_eq!(result[3], 255);
        assert_eq!(result[0], 127);
        assert_eq!(result[2], 128);

        assert_eq!(blend_pixel([10, 20, 30, 0], RED), RED);
    }

    #[test]
    fn test_layer_order_and_clipping() {
        let base = solid(2, 2, RED);
        let corner = solid(1, 1, BLUE);

        let result = composite_layers([&base, &corner]).unwrap();
        assert_eq!(result.dimensions(), (2, 2));
        assert_eq!(result.get_pixel(0, 0).0, BLUE);
        assert_eq!(result.get_pixel(1, 1).0, RED);
    }

    #[test]
    fn test_file_name_matches_metadata_name() {
        let table = TraitTable::from_rows("traits.csv", Vec::new());
        let compositor = Compositor::new(&table, "Space Cat");
        let mut generated = item(vec![]);
        generated.ordinal = 12;
        assert_eq!(compositor.file_name(&generated), "Space Cat #12.png");
    }
}
