//! 日志初始化

use crate::configuration::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// 按配置初始化全局 tracing 订阅者
///
/// 已经存在全局订阅者时不做任何事情并返回 `false`。过滤表达式无效时退回 `info`。
pub fn init_tracing(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if settings.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.is_ok()
}
