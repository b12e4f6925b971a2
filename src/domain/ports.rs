use crate::domain::model::{
    Delivery, DomainResult, FieldGroup, MessageDisposition, ProductIdentifier,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// 產品主資料 API，每個資料域一個讀取操作
#[async_trait]
pub trait MasterDataApi: Send + Sync {
    /// 所有操作都收到完整的鍵值，各自只使用需要的欄位
    async fn fetch(&self, group: FieldGroup, identifiers: &ProductIdentifier)
        -> Result<serde_json::Value>;
}

/// 呼叫結果的下游發布端
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn publish(&self, result: &DomainResult) -> Result<()>;
}

/// 佇列傳輸：依序取得訊息，並對每則訊息回覆一次 Accept / Reject
pub trait Transport: Send {
    fn recv(&mut self) -> impl std::future::Future<Output = Result<Option<Delivery>>> + Send;
    fn settle(
        &mut self,
        delivery: &Delivery,
        disposition: &MessageDisposition,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_service_path(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn request_headers(&self) -> &HashMap<String, String>;
    fn strict_accepter(&self) -> bool;
}
