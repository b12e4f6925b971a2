use crate::config::toml_config::WorkerConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "product-master-worker")]
#[command(about = "Consumes product master change events and refreshes the requested field groups")]
pub struct CliConfig {
    #[arg(long, short, default_value = "worker.toml")]
    pub config: String,

    #[arg(long, help = "Message file (JSON lines); '-' reads stdin. Overrides input.path")]
    pub input: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 載入 TOML 配置並套用命令列覆寫
    pub fn load(&self) -> Result<WorkerConfig> {
        let mut config = WorkerConfig::from_file(&self.config)?;
        if let Some(input) = &self.input {
            config.set_input_path(input.clone());
        }
        Ok(config)
    }
}
