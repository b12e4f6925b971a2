use clap::Parser;
use product_master_worker::core::accepter::CATALOG_REVISION;
use product_master_worker::core::ConfigProvider;
use product_master_worker::utils::{logger, validation::Validate};
use product_master_worker::{
    AccepterPolicy, CliConfig, JsonLinesSink, JsonLinesTransport, SapProductClient, Worker,
    WorkerStats,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(
        cli.verbose,
        cli.json_logs || config.json_logs(),
        config.log_level(),
    );
    tracing::info!("Starting product-master-worker '{}'", config.worker.name);
    if cli.verbose {
        tracing::debug!("Worker config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!(category = ?e.category(), "❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let api = SapProductClient::from_config(&config)?;
    let sink = JsonLinesSink::open(&config.output.results_path).await?;
    let policy = AccepterPolicy::from_strict(config.strict_accepter());
    tracing::info!(
        service = api.service_url(),
        results = %sink.path().display(),
        policy = ?policy,
        catalog_revision = CATALOG_REVISION,
        "Worker ready"
    );

    let worker = Worker::new(api, sink, policy);

    let stats = match config.input_path() {
        Some(path) => {
            tracing::info!("📥 Reading messages from {}", path);
            let transport = JsonLinesTransport::open(path).await?;
            run(&worker, transport, config.dead_letter_path()).await?
        }
        None => {
            tracing::info!("📥 Reading messages from stdin");
            run(&worker, JsonLinesTransport::stdin(), config.dead_letter_path()).await?
        }
    };

    println!(
        "✅ Processed {} messages ({} accepted, {} rejected)",
        stats.received, stats.accepted, stats.rejected
    );
    Ok(())
}

async fn run<R>(
    worker: &Worker<SapProductClient, JsonLinesSink>,
    transport: JsonLinesTransport<R>,
    dead_letter: Option<&str>,
) -> anyhow::Result<WorkerStats>
where
    R: tokio::io::AsyncBufRead + Unpin + Send,
{
    let mut transport = match dead_letter {
        Some(path) => transport.with_dead_letter(path).await?,
        None => transport,
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    Ok(worker.run(&mut transport, shutdown).await?)
}
