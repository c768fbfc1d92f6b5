//! Domain entities for the stock export domain
//!
//! Wire names follow the inventory client's PascalCase field names.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// One inventory line in an export request
///
/// Absent or `null` fields decode as their zero value, matching how upstream
/// stock records arrive (`Group` is frequently `null`). A value of the wrong
/// JSON type is still a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LineItem {
    #[serde(rename = "ItemName", default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(rename = "CostPrice", default, deserialize_with = "null_as_default")]
    pub cost_price: f64,

    #[serde(rename = "SellingPrice", default, deserialize_with = "null_as_default")]
    pub selling_price: f64,

    #[serde(
        rename = "AvailableQuantity",
        default,
        deserialize_with = "null_as_default"
    )]
    pub available_quantity: i64,

    #[serde(rename = "MinQuantity", default, deserialize_with = "null_as_default")]
    pub min_quantity: i64,

    #[serde(rename = "ItemCode", default, deserialize_with = "null_as_default")]
    pub code: String,

    #[serde(rename = "Group", default, deserialize_with = "null_as_default")]
    pub group: String,

    #[serde(rename = "Unit", default, deserialize_with = "null_as_default")]
    pub unit: String,
}

/// Body of `POST /export-stock`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExportRequest {
    /// Recipient address; delivery is the relay's concern
    pub email: String,

    #[validate(length(min = 1, message = "No stock items provided"))]
    pub stock: Vec<LineItem>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
