use crate::utils::error::WorkerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 遠端主資料 API 可獨立刷新的資料域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldGroup {
    Product,
    Plant,
    #[serde(rename = "MRPArea")]
    MrpArea,
    Procurement,
    WorkScheduling,
    SalesPlant,
    Accounting,
    SalesOrganization,
    ProductDescByProduct,
    ProductDescByDesc,
    Quality,
    SalesTax,
}

impl FieldGroup {
    /// 訊息 Accepter 欄位中使用的名稱
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldGroup::Product => "Product",
            FieldGroup::Plant => "Plant",
            FieldGroup::MrpArea => "MRPArea",
            FieldGroup::Procurement => "Procurement",
            FieldGroup::WorkScheduling => "WorkScheduling",
            FieldGroup::SalesPlant => "SalesPlant",
            FieldGroup::Accounting => "Accounting",
            FieldGroup::SalesOrganization => "SalesOrganization",
            FieldGroup::ProductDescByProduct => "ProductDescByProduct",
            FieldGroup::ProductDescByDesc => "ProductDescByDesc",
            FieldGroup::Quality => "Quality",
            FieldGroup::SalesTax => "SalesTax",
        }
    }

    /// 名稱比對區分大小寫，與 Accepter 的 "All" 規則一致
    pub fn from_name(name: &str) -> Option<Self> {
        let group = match name {
            "Product" => FieldGroup::Product,
            "Plant" => FieldGroup::Plant,
            "MRPArea" => FieldGroup::MrpArea,
            "Procurement" => FieldGroup::Procurement,
            "WorkScheduling" => FieldGroup::WorkScheduling,
            "SalesPlant" => FieldGroup::SalesPlant,
            "Accounting" => FieldGroup::Accounting,
            "SalesOrganization" => FieldGroup::SalesOrganization,
            "ProductDescByProduct" => FieldGroup::ProductDescByProduct,
            "ProductDescByDesc" => FieldGroup::ProductDescByDesc,
            "Quality" => FieldGroup::Quality,
            "SalesTax" => FieldGroup::SalesTax,
            _ => return None,
        };
        Some(group)
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 解析後的 Accepter 項目。不在目錄內的名稱原樣保留，交給 Dispatcher 回報
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainName {
    Catalog(FieldGroup),
    Unrecognized(String),
}

impl DomainName {
    pub fn parse(raw: &str) -> Self {
        match FieldGroup::from_name(raw) {
            Some(group) => DomainName::Catalog(group),
            None => DomainName::Unrecognized(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DomainName::Catalog(group) => group.as_str(),
            DomainName::Unrecognized(raw) => raw,
        }
    }
}

impl From<FieldGroup> for DomainName {
    fn from(group: FieldGroup) -> Self {
        DomainName::Catalog(group)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 一筆訊息所描述的產品主資料鍵值，全部為呼叫端的不透明字串
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdentifier {
    pub product: String,
    pub plant: String,
    pub mrp_area: String,
    pub valuation_area: String,
    pub sales_organization: String,
    pub distribution_channel: String,
    pub language: String,
    pub description: String,
    pub country: String,
    pub tax_category: String,
}

/// Decoder 的輸出：鍵值加上原始的 Accepter 清單
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub identifiers: ProductIdentifier,
    pub accepter: Vec<String>,
}

/// 每個資料域成功呼叫後發布到結果端的內容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResult {
    pub message_id: String,
    pub group: FieldGroup,
    pub identifiers: ProductIdentifier,
    pub fetched_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

#[derive(Debug)]
pub enum DispatchOutcome {
    Succeeded,
    Failed(WorkerError),
    Unrecognized,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Succeeded)
    }
}

/// 一個解析項目一個 slot，順序與解析結果相同
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub slots: Vec<(DomainName, DispatchOutcome)>,
}

impl DispatchReport {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn outcome_of(&self, domain: &DomainName) -> Option<&DispatchOutcome> {
        self.slots
            .iter()
            .find(|(name, _)| name == domain)
            .map(|(_, outcome)| outcome)
    }

    pub fn succeeded(&self) -> usize {
        self.slots.iter().filter(|(_, o)| o.is_success()).count()
    }
}

#[derive(Debug)]
pub enum MessageDisposition {
    Accept,
    Reject(WorkerError),
}

impl MessageDisposition {
    pub fn is_accept(&self) -> bool {
        matches!(self, MessageDisposition::Accept)
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            MessageDisposition::Accept => None,
            MessageDisposition::Reject(cause) => Some(cause.to_string()),
        }
    }
}

/// 從佇列取得的原始訊息
#[derive(Debug, Clone)]
pub struct Delivery {
    pub id: String,
    pub payload: Vec<u8>,
}

impl Delivery {
    pub fn new(id: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }
}

/// 訊息的確認結果，可序列化以寫入 dead-letter 或回傳給呼叫端
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub delivery_id: String,
    pub accepted: bool,
    pub reason: Option<String>,
}

impl Settlement {
    pub fn from_disposition(delivery: &Delivery, disposition: &MessageDisposition) -> Self {
        Self {
            delivery_id: delivery.id.clone(),
            accepted: disposition.is_accept(),
            reason: disposition.reason(),
        }
    }
}
