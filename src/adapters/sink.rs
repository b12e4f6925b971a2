use crate::domain::model::DomainResult;
use crate::domain::ports::ResultSink;
use crate::utils::error::{Result, WorkerError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex};

/// 每筆結果寫成一行 JSON，附加到檔案尾端
pub struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesSink {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        tracing::debug!("Results will be appended to {}", path.display());
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for JsonLinesSink {
    async fn publish(&self, result: &DomainResult) -> Result<()> {
        let mut line = serde_json::to_string(result)?;
        line.push('\n');

        // 整行在鎖內寫入，避免並行任務的輸出交錯
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| WorkerError::Sink {
                message: format!("{}: {}", self.path.display(), e),
            })?;
        file.flush().await.map_err(|e| WorkerError::Sink {
            message: format!("{}: {}", self.path.display(), e),
        })?;
        Ok(())
    }
}

/// 將結果轉送到行程內的 channel
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DomainResult>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DomainResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ResultSink for ChannelSink {
    async fn publish(&self, result: &DomainResult) -> Result<()> {
        self.tx.send(result.clone()).map_err(|_| WorkerError::Sink {
            message: "results receiver dropped".to_string(),
        })
    }
}
