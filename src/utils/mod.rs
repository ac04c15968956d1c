// 工具模块 - 随机数与日志

pub mod logger;
pub mod random;

pub use logger::init_logger;
pub use random::{RandomGenerator, RandomStats};
