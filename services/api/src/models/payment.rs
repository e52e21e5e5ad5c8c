//! Payment model, filters, and checkout payloads

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::pagination::PageQuery;

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}

/// Payment entity
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payment_date: NaiveDate,
    pub paid_course_id: Option<Uuid>,
    pub paid_lesson_id: Option<Uuid>,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    /// Gateway checkout-session URL; set only after a successful gateway
    /// round trip
    pub checkout_session_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payment creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub paid_course_id: Option<Uuid>,
    pub paid_lesson_id: Option<Uuid>,
}

/// Query parameters for the payment listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentListQuery {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub course: Option<Uuid>,
    pub lesson: Option<Uuid>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PaymentListQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Paginated payment listing
#[derive(Debug, Clone, Serialize)]
pub struct PaymentListResponse {
    pub items: Vec<Payment>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

/// Response for a successful checkout-session creation
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_round_trips_through_text() {
        assert_eq!(PaymentMethod::from_str("cash"), Ok(PaymentMethod::Cash));
        assert_eq!(
            PaymentMethod::from_str("transfer"),
            Ok(PaymentMethod::Transfer)
        );
        assert!(PaymentMethod::from_str("card").is_err());
        assert_eq!(PaymentMethod::Cash.as_str(), "cash");
    }

    #[test]
    fn payment_method_serde_uses_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Transfer).unwrap();
        assert_eq!(json, "\"transfer\"");
        let parsed: PaymentMethod = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Cash);
    }
}
