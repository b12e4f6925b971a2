use crate::domain::model::{DecodedMessage, ProductIdentifier};
use crate::utils::error::{Result, WorkerError};
use serde::Deserialize;

// 訊息結構，欄位名稱與上游送出的 JSON 相同；只有 Product.Product 為必填

#[derive(Debug, Deserialize)]
struct InboundMessage {
    #[serde(rename = "Product")]
    product: ProductSection,
    #[serde(rename = "Accepter", default)]
    accepter: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ProductSection {
    #[serde(rename = "Product")]
    product: String,
    #[serde(rename = "Plant", default)]
    plant: PlantSection,
    #[serde(rename = "Accounting", default)]
    accounting: AccountingSection,
    #[serde(rename = "SalesOrganization", default)]
    sales_organization: SalesOrganizationSection,
    #[serde(rename = "ProductDescription", default)]
    description: DescriptionSection,
    #[serde(rename = "SalesTax", default)]
    sales_tax: SalesTaxSection,
}

#[derive(Debug, Default, Deserialize)]
struct PlantSection {
    #[serde(rename = "Plant", default)]
    plant: String,
    #[serde(rename = "MRPArea", default)]
    mrp_area: MrpAreaSection,
}

#[derive(Debug, Default, Deserialize)]
struct MrpAreaSection {
    #[serde(rename = "MRPArea", default)]
    mrp_area: String,
}

#[derive(Debug, Default, Deserialize)]
struct AccountingSection {
    #[serde(rename = "ValuationArea", default)]
    valuation_area: String,
}

#[derive(Debug, Default, Deserialize)]
struct SalesOrganizationSection {
    #[serde(rename = "ProductSalesOrg", default)]
    sales_org: String,
    #[serde(rename = "ProductDistributionChnl", default)]
    distribution_channel: String,
}

#[derive(Debug, Default, Deserialize)]
struct DescriptionSection {
    #[serde(rename = "Language", default)]
    language: String,
    #[serde(rename = "ProductDescription", default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct SalesTaxSection {
    #[serde(rename = "Country", default)]
    country: String,
    #[serde(rename = "TaxCategory", default)]
    tax_category: String,
}

/// 解析訊息內容。格式錯誤或缺少必填欄位時回傳 [`WorkerError::Decoding`]
pub fn decode(message_id: &str, payload: &[u8]) -> Result<DecodedMessage> {
    let inbound: InboundMessage =
        serde_json::from_slice(payload).map_err(|e| WorkerError::Decoding {
            message_id: message_id.to_string(),
            reason: e.to_string(),
        })?;

    let p = inbound.product;
    let identifiers = ProductIdentifier {
        product: p.product,
        plant: p.plant.plant,
        mrp_area: p.plant.mrp_area.mrp_area,
        valuation_area: p.accounting.valuation_area,
        sales_organization: p.sales_organization.sales_org,
        distribution_channel: p.sales_organization.distribution_channel,
        language: p.description.language,
        description: p.description.description,
        country: p.sales_tax.country,
        tax_category: p.sales_tax.tax_category,
    };

    Ok(DecodedMessage {
        identifiers,
        accepter: inbound.accepter.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_decode_full_message() {
        let payload = serde_json::json!({
            "ConnectionKey": "request",
            "Product": {
                "Product": "P100",
                "Plant": { "Plant": "PL01", "MRPArea": { "MRPArea": "PL01" } },
                "Accounting": { "ValuationArea": "1710" },
                "SalesOrganization": { "ProductSalesOrg": "1710", "ProductDistributionChnl": "10" },
                "ProductDescription": { "Language": "EN", "ProductDescription": "Bike" },
                "SalesTax": { "Country": "US", "TaxCategory": "UTXJ" }
            },
            "Accepter": ["Plant", "SalesTax"]
        });

        let decoded = assert_ok!(decode("m-1", payload.to_string().as_bytes()));
        let ids = decoded.identifiers;
        assert_eq!(ids.product, "P100");
        assert_eq!(ids.plant, "PL01");
        assert_eq!(ids.mrp_area, "PL01");
        assert_eq!(ids.valuation_area, "1710");
        assert_eq!(ids.sales_organization, "1710");
        assert_eq!(ids.distribution_channel, "10");
        assert_eq!(ids.language, "EN");
        assert_eq!(ids.description, "Bike");
        assert_eq!(ids.country, "US");
        assert_eq!(ids.tax_category, "UTXJ");
        assert_eq!(decoded.accepter, vec!["Plant", "SalesTax"]);
    }

    #[test]
    fn test_decode_missing_sections_default_to_empty() {
        let payload = br#"{"Product": {"Product": "P100", "Plant": {"Plant": "PL01"}}}"#;
        let decoded = assert_ok!(decode("m-2", payload));
        assert_eq!(decoded.identifiers.plant, "PL01");
        assert_eq!(decoded.identifiers.mrp_area, "");
        assert_eq!(decoded.identifiers.country, "");
        assert!(decoded.accepter.is_empty());
    }

    #[test]
    fn test_decode_null_accepter() {
        let payload = br#"{"Product": {"Product": "P100"}, "Accepter": null}"#;
        let decoded = assert_ok!(decode("m-3", payload));
        assert!(decoded.accepter.is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert_err!(decode("m-4", b"not json"));
        assert_err!(decode("m-5", br#"{"Accepter": ["All"]}"#));
        assert_err!(decode("m-6", br#"{"Product": {"Plant": {"Plant": "PL01"}}}"#));
        assert_err!(decode("m-7", br#"{"Product": {"Product": 100}}"#));
        assert_err!(decode("m-8", br#"{"Product": {"Product": "P1"}, "Accepter": "All"}"#));
    }

    #[test]
    fn test_decode_error_carries_message_id() {
        match decode("line-42", b"{") {
            Err(WorkerError::Decoding { message_id, .. }) => assert_eq!(message_id, "line-42"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
