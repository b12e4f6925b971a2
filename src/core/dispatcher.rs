use crate::domain::model::{
    DispatchOutcome, DispatchReport, DomainName, DomainResult, FieldGroup, ProductIdentifier,
};
use crate::domain::ports::{MasterDataApi, ResultSink};
use crate::utils::error::{Result, WorkerError};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinHandle};

/// 將解析後的資料域分派為獨立的 tokio 任務
pub struct Dispatcher<A, S> {
    api: Arc<A>,
    sink: Arc<S>,
}

impl<A, S> Dispatcher<A, S>
where
    A: MasterDataApi + 'static,
    S: ResultSink + 'static,
{
    pub fn new(api: Arc<A>, sink: Arc<S>) -> Self {
        Self { api, sink }
    }

    /// 每個資料域一個任務，全部結束後才回傳。
    ///
    /// 任務彼此獨立：單一任務失敗或 panic 只影響自己的 slot。
    /// 未知的資料域不發出呼叫，記為 [`DispatchOutcome::Unrecognized`]。
    pub async fn dispatch(
        &self,
        message_id: &str,
        identifiers: Arc<ProductIdentifier>,
        domains: Vec<DomainName>,
    ) -> DispatchReport {
        let mut pending: Vec<(DomainName, Option<JoinHandle<Result<()>>>)> =
            Vec::with_capacity(domains.len());

        for domain in domains {
            let handle = match &domain {
                DomainName::Catalog(group) => Some(tokio::spawn(call_and_publish(
                    Arc::clone(&self.api),
                    Arc::clone(&self.sink),
                    message_id.to_string(),
                    *group,
                    Arc::clone(&identifiers),
                ))),
                DomainName::Unrecognized(_) => None,
            };
            pending.push((domain, handle));
        }

        tracing::debug!(tasks = pending.len(), "Field group tasks dispatched");

        // 完成屏障：依序等待每個 handle，任務本身早已並行執行
        let mut slots = Vec::with_capacity(pending.len());
        for (domain, handle) in pending {
            let outcome = match handle {
                None => {
                    tracing::warn!(domain = %domain, "Accepter names an unknown field group");
                    DispatchOutcome::Unrecognized
                }
                Some(handle) => match handle.await {
                    Ok(Ok(())) => DispatchOutcome::Succeeded,
                    Ok(Err(e)) => DispatchOutcome::Failed(e),
                    Err(join_error) => DispatchOutcome::Failed(WorkerError::UnexpectedFault {
                        message: format!("{} task aborted: {}", domain, describe(join_error)),
                    }),
                },
            };
            slots.push((domain, outcome));
        }

        DispatchReport { slots }
    }
}

async fn call_and_publish<A, S>(
    api: Arc<A>,
    sink: Arc<S>,
    message_id: String,
    group: FieldGroup,
    identifiers: Arc<ProductIdentifier>,
) -> Result<()>
where
    A: MasterDataApi,
    S: ResultSink,
{
    let started = Instant::now();
    let payload = api.fetch(group, &identifiers).await?;
    tracing::debug!(
        group = %group,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Field group fetched"
    );

    let result = DomainResult {
        message_id,
        group,
        identifiers: (*identifiers).clone(),
        fetched_at: chrono::Utc::now(),
        payload,
    };
    sink.publish(&result).await
}

pub(crate) fn describe(join_error: JoinError) -> String {
    if join_error.is_panic() {
        let panic = join_error.into_panic();
        if let Some(msg) = panic.downcast_ref::<&str>() {
            format!("panicked: {}", msg)
        } else if let Some(msg) = panic.downcast_ref::<String>() {
            format!("panicked: {}", msg)
        } else {
            "panicked".to_string()
        }
    } else {
        "cancelled".to_string()
    }
}
