use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Banner shown when every criterion holds.
pub const PASSED_BANNER: &str = "Verification Passed";
/// Banner shown when at least one criterion fails.
pub const FAILED_BANNER: &str = "Verification Failed";

/// Structured verdict returned by the vision model for one delivery.
///
/// This is the wire contract with the model: the field names below are the
/// exact camelCase keys requested through [`VerificationResult::response_schema`],
/// and all seven are required when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub vehicle_plate_visible: bool,
    pub goods_being_unloaded: bool,
    pub vehicle_fully_loaded: bool,
    pub vehicle_empty: bool,
    pub receipt_memo_present: bool,
    pub invoice_present: bool,
    pub summary: String,
}

/// One of the six delivery criteria, in checklist display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Criterion {
    VehiclePlateVisible,
    VehicleFullyLoaded,
    GoodsBeingUnloaded,
    VehicleEmpty,
    ReceiptMemoPresent,
    InvoicePresent,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::VehiclePlateVisible,
        Criterion::VehicleFullyLoaded,
        Criterion::GoodsBeingUnloaded,
        Criterion::VehicleEmpty,
        Criterion::ReceiptMemoPresent,
        Criterion::InvoicePresent,
    ];

    /// Wire key used in the response schema.
    pub fn key(self) -> &'static str {
        match self {
            Criterion::VehiclePlateVisible => "vehiclePlateVisible",
            Criterion::VehicleFullyLoaded => "vehicleFullyLoaded",
            Criterion::GoodsBeingUnloaded => "goodsBeingUnloaded",
            Criterion::VehicleEmpty => "vehicleEmpty",
            Criterion::ReceiptMemoPresent => "receiptMemoPresent",
            Criterion::InvoicePresent => "invoicePresent",
        }
    }

    /// Human-readable checklist label.
    pub fn label(self) -> &'static str {
        match self {
            Criterion::VehiclePlateVisible => "Vehicle plate visible",
            Criterion::VehicleFullyLoaded => "Vehicle fully loaded photo",
            Criterion::GoodsBeingUnloaded => "Goods unloading photo",
            Criterion::VehicleEmpty => "Vehicle empty photo",
            Criterion::ReceiptMemoPresent => "Receipt memo present",
            Criterion::InvoicePresent => "Tax invoice present",
        }
    }

    /// Question put to the model for this criterion.
    pub fn description(self) -> &'static str {
        match self {
            Criterion::VehiclePlateVisible => {
                "Is there a clear photo of the vehicle with its registration plate visible?"
            }
            Criterion::GoodsBeingUnloaded => {
                "Is there a photo showing the goods actively being unloaded (e.g., truck bed tilted and material pouring out)?"
            }
            Criterion::VehicleFullyLoaded => {
                "Is there a photo showing the vehicle's tub/bed full of goods before unloading?"
            }
            Criterion::VehicleEmpty => {
                "Is there a photo confirming the vehicle is empty after unloading (e.g., an empty tub or the tub in a fully upright/tilted position)?"
            }
            Criterion::ReceiptMemoPresent => "Is a 'RECEIPT MEMO' document present in the images?",
            Criterion::InvoicePresent => {
                "Is a 'Tax Invoice' or a similar dealer's sale document present in the images?"
            }
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single labeled pass/fail row of the rendered checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub criterion: Criterion,
    pub label: &'static str,
    pub passed: bool,
}

impl VerificationResult {
    /// Value of one criterion.
    pub fn get(&self, criterion: Criterion) -> bool {
        match criterion {
            Criterion::VehiclePlateVisible => self.vehicle_plate_visible,
            Criterion::VehicleFullyLoaded => self.vehicle_fully_loaded,
            Criterion::GoodsBeingUnloaded => self.goods_being_unloaded,
            Criterion::VehicleEmpty => self.vehicle_empty,
            Criterion::ReceiptMemoPresent => self.receipt_memo_present,
            Criterion::InvoicePresent => self.invoice_present,
        }
    }

    /// AND across the six criteria. The summary never affects the verdict.
    pub fn overall_passed(&self) -> bool {
        Criterion::ALL.iter().all(|c| self.get(*c))
    }

    pub fn banner(&self) -> &'static str {
        if self.overall_passed() {
            PASSED_BANNER
        } else {
            FAILED_BANNER
        }
    }

    pub fn checklist(&self) -> Vec<ChecklistItem> {
        Criterion::ALL
            .iter()
            .map(|c| ChecklistItem {
                criterion: *c,
                label: c.label(),
                passed: self.get(*c),
            })
            .collect()
    }

    pub fn failing(&self) -> Vec<Criterion> {
        Criterion::ALL
            .iter()
            .copied()
            .filter(|c| !self.get(*c))
            .collect()
    }

    /// Structured-output schema sent alongside every verification request.
    ///
    /// Six required booleans plus a required one-sentence `summary`, in the
    /// OpenAPI subset the Gemini `responseSchema` field accepts.
    pub fn response_schema() -> Value {
        let mut properties = serde_json::Map::new();
        let schema_order = [
            Criterion::VehiclePlateVisible,
            Criterion::GoodsBeingUnloaded,
            Criterion::VehicleFullyLoaded,
            Criterion::VehicleEmpty,
            Criterion::ReceiptMemoPresent,
            Criterion::InvoicePresent,
        ];
        for c in schema_order {
            properties.insert(
                c.key().to_string(),
                json!({ "type": "BOOLEAN", "description": c.description() }),
            );
        }
        properties.insert(
            "summary".to_string(),
            json!({
                "type": "STRING",
                "description": "A brief, one-sentence summary of the overall verification status.",
            }),
        );

        let mut required: Vec<Value> = schema_order.iter().map(|c| json!(c.key())).collect();
        required.push(json!("summary"));

        json!({
            "type": "OBJECT",
            "properties": Value::Object(properties),
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_true() -> VerificationResult {
        VerificationResult {
            vehicle_plate_visible: true,
            goods_being_unloaded: true,
            vehicle_fully_loaded: true,
            vehicle_empty: true,
            receipt_memo_present: true,
            invoice_present: true,
            summary: "All documents and photos present.".into(),
        }
    }

    #[test]
    fn all_true_passes() {
        let r = all_true();
        assert!(r.overall_passed());
        assert_eq!(r.banner(), PASSED_BANNER);
        assert!(r.failing().is_empty());
    }

    #[test]
    fn single_false_fails_with_one_row() {
        let r = VerificationResult {
            invoice_present: false,
            ..all_true()
        };
        assert!(!r.overall_passed());
        assert_eq!(r.banner(), FAILED_BANNER);
        let failing: Vec<_> = r.checklist().into_iter().filter(|i| !i.passed).collect();
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].label, "Tax invoice present");
    }

    #[test]
    fn summary_does_not_affect_verdict() {
        let r = VerificationResult {
            summary: String::new(),
            ..all_true()
        };
        assert!(r.overall_passed());
    }

    #[test]
    fn checklist_keeps_display_order() {
        let labels: Vec<_> = all_true().checklist().iter().map(|i| i.label).collect();
        assert_eq!(
            labels,
            vec![
                "Vehicle plate visible",
                "Vehicle fully loaded photo",
                "Goods unloading photo",
                "Vehicle empty photo",
                "Receipt memo present",
                "Tax invoice present",
            ]
        );
    }

    #[test]
    fn schema_requires_all_fields() {
        let schema = VerificationResult::response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 7);
        for c in Criterion::ALL {
            assert_eq!(schema["properties"][c.key()]["type"], "BOOLEAN");
            assert!(required.contains(&json!(c.key())));
        }
        assert_eq!(schema["properties"]["summary"]["type"], "STRING");
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let raw = r#"{
            "vehiclePlateVisible": true,
            "goodsBeingUnloaded": false,
            "vehicleFullyLoaded": true,
            "vehicleEmpty": true,
            "receiptMemoPresent": true,
            "invoicePresent": true,
            "summary": "No unloading photo."
        }"#;
        let r: VerificationResult = serde_json::from_str(raw).unwrap();
        assert_eq!(r.failing(), vec![Criterion::GoodsBeingUnloaded]);
    }

    #[test]
    fn missing_field_is_rejected() {
        let raw = r#"{"vehiclePlateVisible": true, "summary": "partial"}"#;
        assert!(serde_json::from_str::<VerificationResult>(raw).is_err());
    }
}
