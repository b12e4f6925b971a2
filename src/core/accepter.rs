use crate::domain::model::{DomainName, FieldGroup};

/// 代表「全部資料域」的 Accepter 值
pub const ALL_SENTINEL: &str = "All";

/// 目錄版本。第 2 版將重複的 WorkScheduling 合併為單一項目
pub const CATALOG_REVISION: u32 = 2;

/// 資料域目錄，順序即為 "All" 展開後的呼叫順序
pub const CATALOG: [FieldGroup; 12] = [
    FieldGroup::Product,
    FieldGroup::Plant,
    FieldGroup::MrpArea,
    FieldGroup::Procurement,
    FieldGroup::WorkScheduling,
    FieldGroup::SalesPlant,
    FieldGroup::Accounting,
    FieldGroup::SalesOrganization,
    FieldGroup::ProductDescByProduct,
    FieldGroup::ProductDescByDesc,
    FieldGroup::Quality,
    FieldGroup::SalesTax,
];

/// 將 Accepter 清單解析為要呼叫的資料域。
///
/// 空清單視為 `["All"]`；第一個元素為 `"All"` 時展開為完整目錄並忽略其餘元素；
/// 否則依原順序逐一轉換，重複項目保留，未知名稱成為 [`DomainName::Unrecognized`]。
pub fn resolve(raw: &[String]) -> Vec<DomainName> {
    match raw.first() {
        None => full_catalog(),
        Some(first) if first == ALL_SENTINEL => full_catalog(),
        Some(_) => raw.iter().map(|name| DomainName::parse(name)).collect(),
    }
}

fn full_catalog() -> Vec<DomainName> {
    CATALOG.iter().copied().map(DomainName::Catalog).collect()
}
