use crate::domain::model::{FieldGroup, ProductIdentifier};
use crate::domain::ports::{ConfigProvider, MasterDataApi};
use crate::utils::error::{Result, WorkerError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_SERVICE_PATH: &str = "API_PRODUCT_SRV";

/// 錯誤訊息中保留的回應內容長度
const BODY_EXCERPT_CHARS: usize = 200;

/// 單一資料域對應的 OData 查詢
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ODataQuery {
    pub entity_set: &'static str,
    pub filter: String,
}

/// 產品主資料 OData 服務的 HTTP 用戶端
pub struct SapProductClient {
    client: Client,
    service_url: String,
}

impl SapProductClient {
    pub fn new(
        base_url: &str,
        service_path: &str,
        timeout: Duration,
        headers: &HashMap<String, String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(build_headers(headers)?)
            .build()?;

        Ok(Self {
            client,
            service_url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                service_path.trim_matches('/')
            ),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.api_base_url(),
            config.api_service_path(),
            Duration::from_secs(config.request_timeout_seconds()),
            config.request_headers(),
        )
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }
}

#[async_trait]
impl MasterDataApi for SapProductClient {
    async fn fetch(
        &self,
        group: FieldGroup,
        identifiers: &ProductIdentifier,
    ) -> Result<serde_json::Value> {
        let query = build_query(group, identifiers);
        let url = format!("{}/{}", self.service_url, query.entity_set);
        tracing::debug!(group = %group, url = %url, filter = %query.filter, "Calling master-data API");

        let response = self
            .client
            .get(&url)
            .query(&[("$filter", query.filter.as_str()), ("$format", "json")])
            .send()
            .await
            .map_err(|e| remote_error(group, e))?;

        let status = response.status();
        tracing::debug!(group = %group, status = %status, "Master-data API responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::RemoteCall {
                group: group.to_string(),
                reason: format!("HTTP {}: {}", status, excerpt(&body)),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| remote_error(group, e))?;
        Ok(unwrap_odata(body))
    }
}

/// 每個資料域對應的實體集合與篩選欄位
pub fn build_query(group: FieldGroup, ids: &ProductIdentifier) -> ODataQuery {
    let (entity_set, filter) = match group {
        FieldGroup::Product => ("A_Product", eq_all(&[("Product", &ids.product)])),
        FieldGroup::Plant => (
            "A_ProductPlant",
            eq_all(&[("Product", &ids.product), ("Plant", &ids.plant)]),
        ),
        FieldGroup::MrpArea => (
            "A_ProductPlantMRPArea",
            eq_all(&[
                ("Product", &ids.product),
                ("Plant", &ids.plant),
                ("MRPArea", &ids.mrp_area),
            ]),
        ),
        FieldGroup::Procurement => (
            "A_ProductPlantProcurement",
            eq_all(&[("Product", &ids.product), ("Plant", &ids.plant)]),
        ),
        FieldGroup::WorkScheduling => (
            "A_ProductWorkScheduling",
            eq_all(&[("Product", &ids.product), ("Plant", &ids.plant)]),
        ),
        FieldGroup::SalesPlant => (
            "A_ProductPlantSales",
            eq_all(&[("Product", &ids.product), ("Plant", &ids.plant)]),
        ),
        FieldGroup::Accounting => (
            "A_ProductValuation",
            eq_all(&[
                ("Product", &ids.product),
                ("ValuationArea", &ids.valuation_area),
            ]),
        ),
        FieldGroup::SalesOrganization => (
            "A_ProductSalesDelivery",
            eq_all(&[
                ("Product", &ids.product),
                ("ProductSalesOrg", &ids.sales_organization),
                ("ProductDistributionChnl", &ids.distribution_channel),
            ]),
        ),
        FieldGroup::ProductDescByProduct => (
            "A_ProductDescription",
            eq_all(&[("Product", &ids.product), ("Language", &ids.language)]),
        ),
        FieldGroup::ProductDescByDesc => (
            "A_ProductDescription",
            format!(
                "{} and substringof({}, ProductDescription)",
                eq_all(&[("Language", &ids.language)]),
                literal(&ids.description)
            ),
        ),
        FieldGroup::Quality => (
            "A_ProductPlantQualityMgmt",
            eq_all(&[("Product", &ids.product), ("Plant", &ids.plant)]),
        ),
        FieldGroup::SalesTax => (
            "A_ProductSalesTax",
            eq_all(&[
                ("Product", &ids.product),
                ("Country", &ids.country),
                ("TaxCategory", &ids.tax_category),
            ]),
        ),
    };

    ODataQuery { entity_set, filter }
}

fn eq_all(pairs: &[(&str, &String)]) -> String {
    pairs
        .iter()
        .map(|(field, value)| format!("{} eq {}", field, literal(value)))
        .collect::<Vec<_>>()
        .join(" and ")
}

// OData 字串常值以單引號包住，內部單引號重複一次
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// OData v2 回應包在 `d` 或 `d.results` 之下
fn unwrap_odata(mut body: serde_json::Value) -> serde_json::Value {
    let Some(mut d) = body.get_mut("d").map(serde_json::Value::take) else {
        return body;
    };
    match d.get_mut("results").map(serde_json::Value::take) {
        Some(results) => results,
        None => d,
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() > BODY_EXCERPT_CHARS {
        let cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{}…", cut)
    } else {
        body.to_string()
    }
}

fn remote_error(group: FieldGroup, e: reqwest::Error) -> WorkerError {
    WorkerError::RemoteCall {
        group: group.to_string(),
        reason: e.to_string(),
    }
}

fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    map.insert(ACCEPT, HeaderValue::from_static("application/json"));

    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| WorkerError::InvalidConfigValueError {
                field: "api.headers".to_string(),
                value: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| WorkerError::InvalidConfigValueError {
                field: format!("api.headers.{}", name),
                value: value.clone(),
                reason: e.to_string(),
            })?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}
