//! Trade extraction from free-text agent replies
//!
//! Agents answer in natural language ("Swapped, received 0.25 ETH. Tx:
//! https://basescan.org/tx/0x..."). This module pulls out the first ETH
//! amount and the first https link and pairs them.
//!
//! The two searches are independent: the link does not have to follow the
//! amount, and a reply that mentions several amounts or links is paired
//! first-with-first. Good enough for a dashboard, not for bookkeeping.
//!
//! Amounts are ASCII digits only. Other scripts' digits ("received ٣ ETH")
//! are not an amount, so the search moves on to the next candidate.

use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

use crate::domain::ParsedTrade;

/// "received 0.25 ETH" / "for 1.5 eth"
static ETH_AMOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:received|for)\s+([0-9.]+)\s+ETH").expect("Invalid regex")
});

/// First https URL up to the next whitespace
static TX_LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https://\S+").expect("Invalid regex"));

/// Extract an `amount -> link` pair from an agent reply.
///
/// Returns `None` when either half is missing or the amount is not a valid
/// number. Never extracts more than one pair.
pub fn parse_trade_response(text: &str) -> Option<ParsedTrade> {
    let amount_eth = extract_eth_amount(text)?;
    let link = extract_tx_link(text)?;
    Some(ParsedTrade { amount_eth, link })
}

/// First "received/for <number> ETH" amount in the text
pub fn extract_eth_amount(text: &str) -> Option<f64> {
    let raw = ETH_AMOUNT_REGEX
        .captures(text)
        .and_then(|cap| cap.get(1))?
        .as_str();

    match raw.parse::<f64>() {
        // The capture only holds digits and dots, so the sign is never negative
        Ok(amount) if amount.is_finite() => Some(amount),
        _ => {
            trace!(raw, "ETH amount did not parse as a number");
            None
        }
    }
}

/// First https link in the text, if it is a well-formed URL
pub fn extract_tx_link(text: &str) -> Option<String> {
    let raw = TX_LINK_REGEX.find(text)?.as_str();
    match url::Url::parse(raw) {
        Ok(_) => Some(raw.to_string()),
        Err(e) => {
            trace!(raw, error = %e, "transaction link is not a valid URL");
            None
        }
    }
}
