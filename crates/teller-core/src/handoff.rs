//! Decides whether a finished reply should open the payment confirmation.
//!
//! A hand-off without a positive amount and a destination account is
//! rejected outright. No placeholder amount is ever substituted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::AskResponse;

/// A payment waiting for the user to confirm or cancel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub amount: Decimal,
    pub account_id: String,
    pub account_name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandoffRejection {
    #[error("hand-off requested without a payment amount")]
    MissingAmount,
    #[error("hand-off requested with non-positive amount {0}")]
    NonPositiveAmount(Decimal),
    #[error("hand-off requested without a destination account")]
    MissingAccount,
}

/// `Ok(None)` when the reply does not ask for a hand-off.
pub fn evaluate(
    response: &AskResponse,
    description: &str,
) -> Result<Option<PendingPayment>, HandoffRejection> {
    if !response.jump_to_other_pages {
        return Ok(None);
    }

    let meta = response.payment_metadata.clone().unwrap_or_default();

    let amount = meta.amount.ok_or(HandoffRejection::MissingAmount)?;
    if amount <= Decimal::ZERO {
        return Err(HandoffRejection::NonPositiveAmount(amount));
    }

    let account_id = meta
        .target_acc_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(HandoffRejection::MissingAccount)?;

    let account_name = meta
        .account_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| account_id.clone());

    Ok(Some(PendingPayment {
        amount,
        account_id,
        account_name,
        description: description.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PaymentMetadata;

    fn meta(amount: Option<i64>, acc: Option<&str>, name: Option<&str>) -> PaymentMetadata {
        PaymentMetadata {
            amount: amount.map(Decimal::from),
            target_acc_id: acc.map(str::to_string),
            account_name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_no_handoff() {
        let resp = AskResponse::reply("hello");
        assert_eq!(evaluate(&resp, "desc"), Ok(None));
    }

    #[test]
    fn test_flag_false_ignores_payment_fields() {
        let mut resp = AskResponse::with_payment("x", meta(Some(10), Some("A"), Some("B")));
        resp.jump_to_other_pages = false;
        assert_eq!(evaluate(&resp, "desc"), Ok(None));
    }

    #[test]
    fn test_complete_handoff() {
        let resp = AskResponse::with_payment(
            "Confirm payment",
            meta(Some(500_000), Some("ACC1"), Some("Electric Co")),
        );
        let payment = evaluate(&resp, "Payment for banking service").unwrap().unwrap();
        assert_eq!(payment.amount, Decimal::from(500_000));
        assert_eq!(payment.account_id, "ACC1");
        assert_eq!(payment.account_name, "Electric Co");
        assert_eq!(payment.description, "Payment for banking service");
    }

    #[test]
    fn test_missing_amount_rejected() {
        let resp = AskResponse::with_payment("x", meta(None, Some("ACC1"), None));
        assert_eq!(evaluate(&resp, "d"), Err(HandoffRejection::MissingAmount));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let resp = AskResponse::with_payment("x", meta(Some(0), Some("ACC1"), None));
        assert_eq!(
            evaluate(&resp, "d"),
            Err(HandoffRejection::NonPositiveAmount(Decimal::ZERO))
        );
    }

    #[test]
    fn test_blank_account_rejected() {
        let resp = AskResponse::with_payment("x", meta(Some(5), Some("  "), None));
        assert_eq!(evaluate(&resp, "d"), Err(HandoffRejection::MissingAccount));
    }

    #[test]
    fn test_missing_metadata_rejected() {
        let mut resp = AskResponse::reply("x");
        resp.jump_to_other_pages = true;
        assert_eq!(evaluate(&resp, "d"), Err(HandoffRejection::MissingAmount));
    }

    #[test]
    fn test_missing_name_falls_back_to_account() {
        let resp = AskResponse::with_payment("x", meta(Some(5), Some("ACC9"), None));
        let payment = evaluate(&resp, "d").unwrap().unwrap();
        assert_eq!(payment.account_name, "ACC9");
    }
}
