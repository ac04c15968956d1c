// 特征组合藏品生成库入口
// 从加权特征表生成唯一的组合、合成图像、元数据与稀有度统计

pub mod core;
pub mod utils;
pub mod collection;

// 重新导出核心类型
pub use crate::core::{GenerationError, GeneratorConfig, Result};
pub use crate::collection::{CollectionEngine, GenerationReport, GenerationRequest};

// 版本信息
pub const VERSION: &str = "0.1.0";
pub const NAME: &str = "traitmint";

// 阶段耗时统计
pub struct PerformanceProfiler {
    start_time: std::time::Instant,
    name: String,
}

impl PerformanceProfiler {
    pub fn new(name: &str) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Drop for PerformanceProfiler {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        if elapsed.as_millis() > 1 {
            log::debug!("性能: {} 耗时 {:.2}ms", self.name, elapsed.as_secs_f64() * 1000.0);
        }
    }
}

// 便利宏
#[macro_export]
macro_rules! profile {
    ($name:expr, $code:block) => {
        {
            let _profiler = $crate::PerformanceProfiler::new($name);
            $code
        }
    };
}
