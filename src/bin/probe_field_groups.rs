use clap::Parser;
use product_master_worker::core::accepter::{resolve, CATALOG_REVISION};
use product_master_worker::core::dispatcher::Dispatcher;
use product_master_worker::core::{
    DispatchOutcome, DomainName, DomainResult, FieldGroup, ProductIdentifier,
};
use product_master_worker::utils::{logger, validation::Validate};
use product_master_worker::{ChannelSink, SapProductClient, WorkerConfig};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// 對單一產品呼叫各資料域一次並列出結果，用於確認 API 連線與篩選條件
#[derive(Debug, Parser)]
#[command(name = "probe_field_groups")]
struct ProbeArgs {
    #[arg(long, short, default_value = "worker.toml")]
    config: String,

    #[arg(long)]
    product: String,

    #[arg(long, default_value = "")]
    plant: String,

    #[arg(long, default_value = "")]
    mrp_area: String,

    #[arg(long, default_value = "")]
    valuation_area: String,

    #[arg(long, default_value = "")]
    sales_org: String,

    #[arg(long, default_value = "")]
    distribution_channel: String,

    #[arg(long, default_value = "EN")]
    language: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, default_value = "")]
    country: String,

    #[arg(long, default_value = "")]
    tax_category: String,

    /// 逗號分隔的資料域，預設 All
    #[arg(long, value_delimiter = ',')]
    groups: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ProbeArgs::parse();

    let config = WorkerConfig::from_file(&args.config)?;
    logger::init_cli_logger(false, config.log_level());
    config.validate()?;
    let api = SapProductClient::from_config(&config)?;
    println!(
        "🚀 Probing {} (catalog revision {})",
        api.service_url(),
        CATALOG_REVISION
    );

    let identifiers = Arc::new(ProductIdentifier {
        product: args.product,
        plant: args.plant,
        mrp_area: args.mrp_area,
        valuation_area: args.valuation_area,
        sales_organization: args.sales_org,
        distribution_channel: args.distribution_channel,
        language: args.language,
        description: args.description,
        country: args.country,
        tax_category: args.tax_category,
    });

    let (sink, mut results) = ChannelSink::channel();
    let dispatcher = Dispatcher::new(Arc::new(api), Arc::new(sink));
    let report = dispatcher
        .dispatch("probe", identifiers, resolve(&args.groups))
        .await;

    let mut published = Vec::new();
    while let Ok(result) = results.try_recv() {
        published.push(result);
    }
    let mut sizes = row_counts(&published);

    println!("\n📊 Field groups:");
    for (domain, outcome) in &report.slots {
        match outcome {
            DispatchOutcome::Succeeded => {
                let rows = match domain {
                    DomainName::Catalog(group) => sizes
                        .get_mut(group)
                        .and_then(VecDeque::pop_front)
                        .unwrap_or(0),
                    DomainName::Unrecognized(_) => 0,
                };
                println!("  ✅ {:<22} {} rows", domain, rows);
            }
            DispatchOutcome::Failed(e) => println!("  ❌ {:<22} {}", domain, e),
            DispatchOutcome::Unrecognized => println!("  ❓ {:<22} unknown field group", domain),
        }
    }
    println!(
        "\n📈 {}/{} field groups succeeded",
        report.succeeded(),
        report.len()
    );

    Ok(())
}

/// 每個資料域的筆數依發布順序排隊，重複的資料域各自取一筆
fn row_counts(results: &[DomainResult]) -> HashMap<FieldGroup, VecDeque<usize>> {
    let mut sizes: HashMap<FieldGroup, VecDeque<usize>> = HashMap::new();
    for result in results {
        let rows = result.payload.as_array().map(Vec::len).unwrap_or(1);
        sizes.entry(result.group).or_default().push_back(rows);
    }
    sizes
}
