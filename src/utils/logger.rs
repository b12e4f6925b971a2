use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 優先順序：--verbose，其次設定檔的 logging.level，最後為 info
fn directive(verbose: bool, level: Option<&str>) -> String {
    match (verbose, level) {
        (true, _) => "product_master_worker=debug,info".to_string(),
        (false, Some(level)) => format!("product_master_worker={}", level),
        (false, None) => "product_master_worker=info".to_string(),
    }
}

/// RUST_LOG 有設定時完全以它為準
fn build_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(verbose, level)))
}

pub fn init_cli_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(build_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 部署在容器中時使用 JSON 格式，方便集中收集日誌
pub fn init_json_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(build_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

pub fn init_logger(verbose: bool, json: bool, level: Option<&str>) {
    if json {
        init_json_logger(verbose, level);
    } else {
        init_cli_logger(verbose, level);
    }
}
