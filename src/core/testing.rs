//! 單元測試共用的 API 與結果端替身

use crate::domain::model::{DomainResult, FieldGroup, ProductIdentifier};
use crate::domain::ports::{MasterDataApi, ResultSink};
use crate::utils::error::{Result, WorkerError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct MockApi {
    failing: HashSet<FieldGroup>,
    panicking: HashSet<FieldGroup>,
    delays: HashMap<FieldGroup, Duration>,
    calls: Mutex<Vec<(FieldGroup, ProductIdentifier)>>,
    completed: Mutex<Vec<FieldGroup>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, group: FieldGroup) -> Self {
        self.failing.insert(group);
        self
    }

    pub fn panicking(mut self, group: FieldGroup) -> Self {
        self.panicking.insert(group);
        self
    }

    pub fn delayed(mut self, group: FieldGroup, delay: Duration) -> Self {
        self.delays.insert(group, delay);
        self
    }

    pub fn calls(&self) -> Vec<(FieldGroup, ProductIdentifier)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn completion_order(&self) -> Vec<FieldGroup> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MasterDataApi for MockApi {
    async fn fetch(
        &self,
        group: FieldGroup,
        identifiers: &ProductIdentifier,
    ) -> Result<serde_json::Value> {
        self.calls
            .lock()
            .unwrap()
            .push((group, identifiers.clone()));

        if let Some(delay) = self.delays.get(&group) {
            tokio::time::sleep(*delay).await;
        }
        if self.panicking.contains(&group) {
            panic!("mock api exploded on {}", group);
        }

        self.completed.lock().unwrap().push(group);

        if self.failing.contains(&group) {
            return Err(WorkerError::RemoteCall {
                group: group.to_string(),
                reason: "HTTP 500 Internal Server Error".to_string(),
            });
        }
        Ok(serde_json::json!({ "group": group.as_str(), "product": identifiers.product }))
    }
}

#[derive(Default)]
pub struct MockSink {
    fail: bool,
    results: Mutex<Vec<DomainResult>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn results(&self) -> Vec<DomainResult> {
        self.results.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSink for MockSink {
    async fn publish(&self, result: &DomainResult) -> Result<()> {
        if self.fail {
            return Err(WorkerError::Sink {
                message: "downstream channel closed".to_string(),
            });
        }
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}
