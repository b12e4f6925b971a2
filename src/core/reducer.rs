use crate::domain::model::{DispatchOutcome, DispatchReport, MessageDisposition};
use crate::utils::error::WorkerError;

/// Accepter 中出現未知資料域時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccepterPolicy {
    /// 未知名稱視為失敗，訊息 Reject
    #[default]
    Strict,
    /// 只記錄警告
    Lenient,
}

impl AccepterPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            AccepterPolicy::Strict
        } else {
            AccepterPolicy::Lenient
        }
    }
}

/// 將所有 slot 的結果歸約為單一的 Accept / Reject。
///
/// 每個失敗的資料域都會記錄；依 slot 順序第一個失敗作為 Reject 的原因。
pub fn reduce(report: DispatchReport, policy: AccepterPolicy) -> MessageDisposition {
    let total = report.len();
    let mut failed = 0usize;
    let mut cause: Option<WorkerError> = None;

    for (domain, outcome) in report.slots {
        let error = match outcome {
            DispatchOutcome::Succeeded => continue,
            DispatchOutcome::Unrecognized => match policy {
                AccepterPolicy::Lenient => {
                    tracing::warn!(domain = %domain, "Ignoring unknown field group");
                    continue;
                }
                AccepterPolicy::Strict => WorkerError::UnrecognizedDomain {
                    domain: domain.to_string(),
                },
            },
            DispatchOutcome::Failed(error) => error,
        };

        failed += 1;
        tracing::error!(
            domain = %domain,
            category = ?error.category(),
            error = %error,
            "Field group failed"
        );
        if cause.is_none() {
            cause = Some(error);
        }
    }

    match cause {
        None => MessageDisposition::Accept,
        Some(cause) => {
            tracing::warn!(failed, total, "Rejecting message");
            MessageDisposition::Reject(cause)
        }
    }
}
