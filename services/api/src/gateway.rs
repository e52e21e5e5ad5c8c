//! Payment gateway client
//!
//! Drives the three-step checkout-session creation against a Stripe-style
//! HTTP API: create a product, create a price for it, then open a checkout
//! session. All calls are form-encoded POSTs authenticated with the secret
//! key.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by the gateway client
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport-level failure talking to the gateway
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway rejected the request
    #[error("Gateway error: {0}")]
    Api(String),

    /// The amount cannot be represented in the gateway's minor units
    #[error("Amount not representable in minor units")]
    InvalidAmount,
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Secret API key
    pub secret_key: String,
    /// API base URL
    pub base_url: String,
    /// ISO currency code for prices
    pub currency: String,
    /// Redirect target after a completed checkout
    pub success_url: String,
    /// Redirect target after an abandoned checkout
    pub cancel_url: String,
}

impl GatewayConfig {
    /// Create a new GatewayConfig from environment variables
    pub fn from_env() -> Self {
        GatewayConfig {
            secret_key: std::env::var("PAYMENT_GATEWAY_SECRET_KEY").unwrap_or_default(),
            base_url: std::env::var("PAYMENT_GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            currency: std::env::var("PAYMENT_GATEWAY_CURRENCY")
                .unwrap_or_else(|_| "usd".to_string()),
            success_url: std::env::var("PAYMENT_SUCCESS_URL")
                .unwrap_or_else(|_| "https://localhost/payment/success".to_string()),
            cancel_url: std::env::var("PAYMENT_CANCEL_URL")
                .unwrap_or_else(|_| "https://localhost/payment/cancel".to_string()),
        }
    }
}

#[derive(Deserialize)]
struct GatewayObject {
    id: String,
}

#[derive(Deserialize)]
struct GatewaySession {
    url: String,
}

#[derive(Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Deserialize)]
struct GatewayErrorDetail {
    message: String,
}

/// Convert a decimal currency amount into the gateway's integer minor-unit
/// representation (multiply by 100, truncate)
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::from(100)).trunc().to_i64()
}

/// Payment gateway client
#[derive(Clone)]
pub struct PaymentGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl PaymentGateway {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .post(format!("{}{}", self.config.base_url, path))
            .bearer_auth(&self.config.secret_key)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let message = match response.json::<GatewayErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => "Unrecognized gateway error".to_string(),
            };
            return Err(GatewayError::Api(message));
        }

        Ok(response.json::<T>().await?)
    }

    /// Create a product record in the gateway; returns the product id
    pub async fn create_product(&self, name: &str) -> Result<String, GatewayError> {
        let object: GatewayObject = self
            .post("/v1/products", &[("name", name.to_string())])
            .await?;
        Ok(object.id)
    }

    /// Create a price for a product; the amount is converted to minor units
    pub async fn create_price(
        &self,
        product_id: &str,
        amount: Decimal,
    ) -> Result<String, GatewayError> {
        let unit_amount = to_minor_units(amount).ok_or(GatewayError::InvalidAmount)?;

        let object: GatewayObject = self
            .post(
                "/v1/prices",
                &[
                    ("unit_amount", unit_amount.to_string()),
                    ("currency", self.config.currency.clone()),
                    ("product", product_id.to_string()),
                ],
            )
            .await?;
        Ok(object.id)
    }

    /// Create a checkout session for a price; returns the session URL the
    /// payer is redirected to
    pub async fn create_checkout_session(&self, price_id: &str) -> Result<String, GatewayError> {
        let session: GatewaySession = self
            .post(
                "/v1/checkout/sessions",
                &[
                    ("mode", "payment".to_string()),
                    ("line_items[0][price]", price_id.to_string()),
                    ("line_items[0][quantity]", "1".to_string()),
                    ("success_url", self.config.success_url.clone()),
                    ("cancel_url", self.config.cancel_url.clone()),
                ],
            )
            .await?;
        Ok(session.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn whole_amounts_convert_to_cents() {
        assert_eq!(to_minor_units(Decimal::from(50)), Some(5000));
        assert_eq!(to_minor_units(Decimal::ZERO), Some(0));
    }

    #[test]
    fn fractional_amounts_convert_exactly() {
        let amount = Decimal::from_str("49.99").unwrap();
        assert_eq!(to_minor_units(amount), Some(4999));
    }

    #[test]
    fn sub_cent_precision_is_truncated() {
        let amount = Decimal::from_str("49.999").unwrap();
        assert_eq!(to_minor_units(amount), Some(4999));
    }
}
