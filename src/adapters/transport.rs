use crate::domain::model::{Delivery, MessageDisposition, Settlement};
use crate::domain::ports::Transport;
use crate::utils::error::{Result, WorkerError};
use serde::Serialize;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::mpsc;

/// 寫入 dead-letter 檔的內容：確認結果加上原始訊息
#[derive(Debug, Serialize)]
struct DeadLetter<'a> {
    settlement: &'a Settlement,
    payload: String,
}

/// 每一行非空白內容為一則訊息，id 為 `line-{行號}`。
///
/// 以位元組讀取，不要求 UTF-8；格式錯誤交給 decoder 轉成 Reject。
pub struct JsonLinesTransport<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: u64,
    dead_letter: Option<File>,
}

impl<R> JsonLinesTransport<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
            dead_letter: None,
        }
    }

    /// Reject 的訊息會附加到此檔案
    pub async fn with_dead_letter<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        self.dead_letter = Some(file);
        Ok(self)
    }
}

impl JsonLinesTransport<BufReader<File>> {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).await.map_err(|e| WorkerError::Transport {
            message: format!("cannot open {}: {}", path.as_ref().display(), e),
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl JsonLinesTransport<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> Transport for JsonLinesTransport<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<Delivery>> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(|e| WorkerError::Transport {
                    message: format!("read failed after line {}: {}", self.line_no, e),
                })?;

            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let line = strip_line_ending(&self.buf);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(Delivery::new(
                format!("line-{}", self.line_no),
                line.to_vec(),
            )));
        }
    }

    async fn settle(&mut self, delivery: &Delivery, disposition: &MessageDisposition) -> Result<()> {
        let settlement = Settlement::from_disposition(delivery, disposition);

        if settlement.accepted {
            tracing::info!(message_id = %delivery.id, "✅ Message accepted");
            return Ok(());
        }

        tracing::warn!(
            message_id = %delivery.id,
            reason = settlement.reason.as_deref().unwrap_or_default(),
            "❌ Message rejected"
        );

        if let Some(file) = self.dead_letter.as_mut() {
            let entry = DeadLetter {
                settlement: &settlement,
                payload: String::from_utf8_lossy(&delivery.payload).into_owned(),
            };
            let mut line = serde_json::to_string(&entry)?;
            line.push('\n');
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }

        Ok(())
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// 行程內的傳輸層，用於嵌入其他服務或測試
pub struct ChannelTransport {
    rx: mpsc::Receiver<Delivery>,
    settled: mpsc::UnboundedSender<Settlement>,
}

impl ChannelTransport {
    pub fn pair(
        capacity: usize,
    ) -> (
        Self,
        mpsc::Sender<Delivery>,
        mpsc::UnboundedReceiver<Settlement>,
    ) {
        let (tx, rx) = mpsc::channel(capacity);
        let (settled, settlements) = mpsc::unbounded_channel();
        (Self { rx, settled }, tx, settlements)
    }
}

impl Transport for ChannelTransport {
    async fn recv(&mut self) -> Result<Option<Delivery>> {
        Ok(self.rx.recv().await)
    }

    async fn settle(&mut self, delivery: &Delivery, disposition: &MessageDisposition) -> Result<()> {
        self.settled
            .send(Settlement::from_disposition(delivery, disposition))
            .map_err(|_| WorkerError::Transport {
                message: "settlement receiver dropped".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_json_lines_transport_skips_blank_lines() {
        let input = "{\"a\":1}\n\n   \n{\"b\":2}\n";
        let mut transport = JsonLinesTransport::new(BufReader::new(input.as_bytes()));

        let first = transport.recv().await.unwrap().unwrap();
        assert_eq!(first.id, "line-1");
        assert_eq!(first.payload, b"{\"a\":1}");

        let second = transport.recv().await.unwrap().unwrap();
        assert_eq!(second.id, "line-4");

        assert!(transport.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_lines_transport_passes_invalid_utf8_through() {
        let mut input = b"{\"Product\":{\"Product\":\"P\xff\"}}\r\n".to_vec();
        input.extend_from_slice(b"{\"b\":2}\r\n{\"c\":3}");
        let mut transport = JsonLinesTransport::new(BufReader::new(&input[..]));

        let first = transport.recv().await.unwrap().unwrap();
        assert_eq!(first.id, "line-1");
        assert_eq!(first.payload, b"{\"Product\":{\"Product\":\"P\xff\"}}");

        let second = transport.recv().await.unwrap().unwrap();
        assert_eq!(second.id, "line-2");
        assert_eq!(second.payload, b"{\"b\":2}");

        // 最後一行沒有換行符號
        let third = transport.recv().await.unwrap().unwrap();
        assert_eq!(third.id, "line-3");
        assert_eq!(third.payload, b"{\"c\":3}");

        assert!(transport.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_message_goes_to_dead_letter() {
        let temp_dir = TempDir::new().unwrap();
        let dead_letter = temp_dir.path().join("rejected.jsonl");

        let mut transport = JsonLinesTransport::new(BufReader::new("garbage\n{}\n".as_bytes()))
            .with_dead_letter(&dead_letter)
            .await
            .unwrap();

        let rejected = transport.recv().await.unwrap().unwrap();
        transport
            .settle(
                &rejected,
                &MessageDisposition::Reject(WorkerError::Decoding {
                    message_id: rejected.id.clone(),
                    reason: "expected value at line 1 column 1".to_string(),
                }),
            )
            .await
            .unwrap();

        let accepted = transport.recv().await.unwrap().unwrap();
        transport
            .settle(&accepted, &MessageDisposition::Accept)
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&dead_letter).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);

        let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(entry["payload"], "garbage");
        assert_eq!(entry["settlement"]["deliveryId"], "line-1");
        assert_eq!(entry["settlement"]["accepted"], false);
    }

    #[tokio::test]
    async fn test_open_missing_file_is_transport_error() {
        let result = JsonLinesTransport::open("/definitely/not/here.jsonl").await;
        assert!(matches!(result, Err(WorkerError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_channel_transport_reports_settlements() {
        let (mut transport, tx, mut settlements) = ChannelTransport::pair(2);
        tx.send(Delivery::new("d-1", "{}")).await.unwrap();
        drop(tx);

        let delivery = transport.recv().await.unwrap().unwrap();
        transport
            .settle(&delivery, &MessageDisposition::Accept)
            .await
            .unwrap();
        assert!(transport.recv().await.unwrap().is_none());

        let settlement = settlements.recv().await.unwrap();
        assert_eq!(
            settlement,
            Settlement {
                delivery_id: "d-1".to_string(),
                accepted: true,
                reason: None
            }
        );
    }
}
