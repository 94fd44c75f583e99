//! Wire types for the assistant backend.
//!
//! The hand-off fields use the `jump_to_other_pages` / `target_acc_id`
//! schema. Older backends sent `jump` and `account_id`; those names are not
//! read, so such a response is treated as having no hand-off.
//!
//! Decoding is lenient: `null` reads as the field's default, and a payment
//! block that cannot be read becomes "no amount" or "no account" so the
//! hand-off gate can reject it while the reply text survives.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// `null` or missing reads as `T::default()`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Amounts arrive as JSON numbers or numeric strings. Anything else is `None`.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let text = match &value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => String::new(),
    };
    let amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok();
    if amount.is_none() {
        warn!(%value, "unreadable payment amount");
    }
    Ok(amount)
}

/// Account ids may come as strings or bare numbers
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// A payment block of the wrong shape is treated as absent
fn lenient_metadata<'de, D>(deserializer: D) -> Result<Option<PaymentMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) => {
            warn!(error = %e, "unreadable payment metadata");
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub user_input: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target_acc_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub response: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jump_to_other_pages: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub jumping_page: Option<String>,
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub payment_metadata: Option<PaymentMetadata>,
}

impl AskResponse {
    /// A successful reply without hand-off
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            success: true,
            response: text.into(),
            ..Self::default()
        }
    }

    /// A successful reply that asks the client to start a payment
    pub fn with_payment(text: impl Into<String>, payment: PaymentMetadata) -> Self {
        Self {
            success: true,
            response: text.into(),
            jump_to_other_pages: true,
            jumping_page: Some("verification".to_string()),
            payment_metadata: Some(payment),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UserIdRequest<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RecommendationResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_full_handoff_response() {
        let body = json!({
            "success": true,
            "response": "Confirm payment",
            "jump_to_other_pages": true,
            "jumping_page": "verification",
            "payment_metadata": {
                "amount": 500000,
                "target_acc_id": "ACC1",
                "account_name": "Electric Co"
            }
        });
        let resp: AskResponse = serde_json::from_value(body).unwrap();
        assert!(resp.jump_to_other_pages);
        let payment = resp.payment_metadata.unwrap();
        assert_eq!(payment.amount, Some(Decimal::from(500_000)));
        assert_eq!(payment.target_acc_id.as_deref(), Some("ACC1"));
    }

    #[test]
    fn test_missing_fields_default() {
        let resp: AskResponse = serde_json::from_value(json!({ "success": true })).unwrap();
        assert_eq!(resp.response, "");
        assert!(!resp.jump_to_other_pages);
        assert!(resp.payment_metadata.is_none());
    }

    #[test]
    fn test_deprecated_handoff_names_are_ignored() {
        let body = json!({
            "success": true,
            "response": "ok",
            "jump": true,
            "payment_metadata": { "amount": 10, "account_id": "OLD" }
        });
        let resp: AskResponse = serde_json::from_value(body).unwrap();
        assert!(!resp.jump_to_other_pages);
        assert_eq!(resp.payment_metadata.unwrap().target_acc_id, None);
    }

    #[test]
    fn test_null_amount() {
        let body = json!({ "amount": null, "target_acc_id": "A" });
        let meta: PaymentMetadata = serde_json::from_value(body).unwrap();
        assert_eq!(meta.amount, None);
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let resp: AskResponse = serde_json::from_value(json!({
            "success": false,
            "response": null,
            "jump_to_other_pages": null,
        }))
        .unwrap();
        assert!(!resp.success);
        assert_eq!(resp.response, "");
        assert!(!resp.jump_to_other_pages);

        let resp: AskResponse =
            serde_json::from_value(json!({ "success": null, "response": "hi" })).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_unreadable_amount_keeps_reply() {
        let body = json!({
            "success": true,
            "response": "Confirm payment",
            "jump_to_other_pages": true,
            "payment_metadata": { "amount": "abc", "target_acc_id": "ACC1" }
        });
        let resp: AskResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.response, "Confirm payment");
        let meta = resp.payment_metadata.unwrap();
        assert_eq!(meta.amount, None);
        assert_eq!(meta.target_acc_id.as_deref(), Some("ACC1"));
    }

    #[test]
    fn test_amount_from_string_and_numeric_account() {
        let meta: PaymentMetadata = serde_json::from_value(json!({
            "amount": " 250000.50 ",
            "target_acc_id": 123456,
        }))
        .unwrap();
        assert_eq!(meta.amount, Some(Decimal::from_str("250000.50").unwrap()));
        assert_eq!(meta.target_acc_id.as_deref(), Some("123456"));
    }

    #[test]
    fn test_malformed_payment_block_is_absent() {
        let body = json!({
            "success": true,
            "response": "ok",
            "jump_to_other_pages": true,
            "payment_metadata": "pending"
        });
        let resp: AskResponse = serde_json::from_value(body).unwrap();
        assert!(resp.payment_metadata.is_none());
        assert_eq!(resp.response, "ok");
    }
}
