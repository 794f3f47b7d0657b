pub mod api;
pub mod core;

use once_cell::sync::OnceCell;

/// 幂等的日志初始化，重复调用无副作用
pub fn init_logging() {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_init(|| {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .try_init();
    });
}
