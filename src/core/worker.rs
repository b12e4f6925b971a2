use crate::core::accepter::resolve;
use crate::core::decoder::decode;
use crate::core::dispatcher::{describe, Dispatcher};
use crate::core::reducer::{reduce, AccepterPolicy};
use crate::domain::model::{Delivery, MessageDisposition};
use crate::domain::ports::{MasterDataApi, ResultSink, Transport};
use crate::utils::error::{Result, WorkerError};
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;

/// 控制迴圈的累計統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub received: u64,
    pub accepted: u64,
    pub rejected: u64,
}

pub struct Worker<A, S> {
    dispatcher: Arc<Dispatcher<A, S>>,
    policy: AccepterPolicy,
    /// 訊息 id 相符時讓訊息任務本身 panic
    #[cfg(test)]
    panic_on: Option<String>,
}

impl<A, S> Worker<A, S>
where
    A: MasterDataApi + 'static,
    S: ResultSink + 'static,
{
    pub fn new(api: A, sink: S, policy: AccepterPolicy) -> Self {
        Self::from_shared(Arc::new(api), Arc::new(sink), policy)
    }

    pub fn from_shared(api: Arc<A>, sink: Arc<S>, policy: AccepterPolicy) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(api, sink)),
            policy,
            #[cfg(test)]
            panic_on: None,
        }
    }

    #[cfg(test)]
    fn panicking_on(mut self, message_id: &str) -> Self {
        self.panic_on = Some(message_id.to_string());
        self
    }

    /// 處理單一訊息，必定產生一個 Accept 或 Reject。
    ///
    /// decode、resolve、dispatch、reduce 在獨立的任務中執行；
    /// 任何錯誤或 panic 都在此轉為 Reject，不會傳到控制迴圈。
    pub async fn handle(&self, delivery: &Delivery) -> MessageDisposition {
        let dispatcher = Arc::clone(&self.dispatcher);
        let policy = self.policy;
        let message_id = delivery.id.clone();
        let payload = delivery.payload.clone();
        let span = tracing::info_span!("message", message_id = %delivery.id);
        #[cfg(test)]
        let panic_on = self.panic_on.clone();

        let task = tokio::spawn(
            async move {
                #[cfg(test)]
                if panic_on.as_deref() == Some(message_id.as_str()) {
                    panic!("fault injected for {}", message_id);
                }
                process(&dispatcher, &message_id, &payload, policy).await
            }
            .instrument(span.clone()),
        );

        let joined = task.await;
        span.in_scope(|| match joined {
            Ok(Ok(disposition)) => disposition,
            Ok(Err(e)) => {
                tracing::error!(category = ?e.category(), error = %e, "Message processing failed");
                MessageDisposition::Reject(e)
            }
            Err(join_error) => {
                let fault = WorkerError::UnexpectedFault {
                    message: format!("message task {}", describe(join_error)),
                };
                tracing::error!(error = %fault, "Message processing aborted");
                MessageDisposition::Reject(fault)
            }
        })
    }

    /// 依序從傳輸層取得訊息直到串流結束或收到 shutdown。
    ///
    /// 前一則訊息確認完成後才會取下一則。確認失敗只記錄日誌；接收失敗則結束迴圈。
    pub async fn run<T, F>(&self, transport: &mut T, shutdown: F) -> Result<WorkerStats>
    where
        T: Transport,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = WorkerStats::default();

        loop {
            let delivery = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("🛑 Shutdown requested, leaving control loop");
                    break;
                }
                next = transport.recv() => match next? {
                    Some(delivery) => delivery,
                    None => {
                        tracing::info!("Transport drained");
                        break;
                    }
                },
            };

            stats.received += 1;
            let disposition = self.handle(&delivery).await;
            if disposition.is_accept() {
                stats.accepted += 1;
            } else {
                stats.rejected += 1;
            }

            if let Err(e) = transport.settle(&delivery, &disposition).await {
                tracing::error!(
                    message_id = %delivery.id,
                    error = %e,
                    "Failed to acknowledge message"
                );
            }
        }

        tracing::info!(
            received = stats.received,
            accepted = stats.accepted,
            rejected = stats.rejected,
            "Worker stopped"
        );
        Ok(stats)
    }
}

async fn process<A, S>(
    dispatcher: &Dispatcher<A, S>,
    message_id: &str,
    payload: &[u8],
    policy: AccepterPolicy,
) -> Result<MessageDisposition>
where
    A: MasterDataApi + 'static,
    S: ResultSink + 'static,
{
    let decoded = decode(message_id, payload)?;
    let domains = resolve(&decoded.accepter);
    tracing::info!(
        product = %decoded.identifiers.product,
        plant = %decoded.identifiers.plant,
        domains = domains.len(),
        "Dispatching field groups"
    );

    let report = dispatcher
        .dispatch(message_id, Arc::new(decoded.identifiers), domains)
        .await;
    tracing::debug!(
        succeeded = report.succeeded(),
        total = report.len(),
        "All field group calls completed"
    );

    Ok(reduce(report, policy))
}
