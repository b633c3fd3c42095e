//! 日志初始化
//!
//! 库本身只通过 `tracing` 发事件；嵌入方可以自带订阅器，
//! 也可以调用这里的 `init` 使用默认的控制台输出。

use tracing_subscriber::EnvFilter;

/// 安装默认的 tracing 订阅器（RUST_LOG 可覆盖级别，默认 info）。
/// 已存在全局订阅器时静默跳过。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
