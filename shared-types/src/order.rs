use serde::{Deserialize, Serialize};

/// Column order of the tabular export. Must match the field order of
/// `OrderRecord` so serialized rows line up with the header.
pub const EXPORT_COLUMNS: [&str; 7] = [
    "order_number",
    "phone_number",
    "first_name",
    "last_name",
    "email_address",
    "quantity",
    "total",
];

/// One donation order recovered from an order-confirmation email.
///
/// Every field is optional: templates vary and partial recovery is an
/// expected, valid state rather than an error. Absent fields serialize as
/// empty CSV cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_number: Option<String>,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub quantity: Option<String>,
    pub total: Option<String>,
}

impl OrderRecord {
    /// A record with no fields recovered yet.
    pub fn empty() -> Self {
        Self {
            order_number: None,
            phone_number: None,
            first_name: None,
            last_name: None,
            email_address: None,
            quantity: None,
            total: None,
        }
    }
}
