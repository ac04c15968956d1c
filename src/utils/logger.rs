// 日志初始化
// 默认过滤级别来自配置，RUST_LOG 环境变量优先

use env_logger::{Builder, Env};

/// 初始化全局日志；重复调用时保留第一次的设置
pub fn init_logger(default_level: &str) {
    let filter = if default_level.trim().is_empty() { "info" } else { default_level };

    if let Err(e) = Builder::from_env(Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init()
    {
        log::debug!("日志系统已初始化: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init_logger("debug");
        init_logger("");
        log::info!("logger ready");
    }
}
