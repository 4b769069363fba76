//! Data models for the Duino-Coin monitor
//!
//! Wire types decode leniently: a missing, null or mistyped field becomes
//! 0 / "" instead of failing the whole response.

use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Currency symbol used by Duino-Coin
pub const DUCO: &str = "ᕲ";

// ============================================================================
// LENIENT FIELD DECODERS
// ============================================================================

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
}

fn lenient_struct<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(d)?).unwrap_or_default())
}

fn lenient_option<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        value => Ok(serde_json::from_value(value).ok()),
    }
}

fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(d)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

// ============================================================================
// API RESPONSES
// ============================================================================

/// Envelope of `/v2/users/{username}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserResponse {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_option")]
    pub result: Option<UserData>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
}

/// Account detail payload
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserData {
    #[serde(default, deserialize_with = "lenient_struct")]
    pub balance: BalanceInfo,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub miners: Vec<Miner>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BalanceInfo {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub balance: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub verified: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub trust_score: f64,
}

impl BalanceInfo {
    pub fn is_verified(&self) -> bool {
        self.verified == "yes"
    }
}

/// One miner as reported by the API
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Miner {
    #[serde(default, deserialize_with = "lenient_string")]
    pub software: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub identifier: String,
    /// H/s
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hashrate: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub accepted: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rejected: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pool: String,
}

/// `/api.json`, everything but the price is ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceResponse {
    #[serde(rename = "Duco price", default, deserialize_with = "lenient_f64")]
    pub duco_price: f64,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Everything one tick produced, ready for display
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub username: String,
    pub updated_at: DateTime<Local>,
    pub balance: f64,
    pub balance_usd: f64,
    pub price_usd: f64,
    pub verified: bool,
    pub trust_score: f64,
    pub daily_earnings: f64,
    pub daily_earnings_usd: f64,
    pub miners: Vec<MinerRow>,
    pub mining: MiningTotals,
}

/// Miner table row with its hash rate pre-formatted
#[derive(Debug, Clone, PartialEq)]
pub struct MinerRow {
    /// 1-based position in the API listing
    pub id: usize,
    pub software: String,
    pub identifier: String,
    pub hashrate_display: String,
    pub accepted: u64,
    pub rejected: u64,
    pub pool: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MiningTotals {
    pub total_hashrate: f64,
    pub total_hashrate_display: String,
    pub total_accepted: u64,
    pub total_rejected: u64,
    /// Percent, 0 when no shares were submitted
    pub acceptance_rate: f64,
    pub active_miners: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_user_response() {
        let body = serde_json::json!({
            "success": true,
            "result": {
                "balance": { "balance": 12.5, "verified": "yes", "trust_score": 90 },
                "miners": [{
                    "software": "x", "identifier": "y", "hashrate": 2500,
                    "accepted": 10, "rejected": 0, "pool": "p"
                }]
            }
        });

        let response: UserResponse = serde_json::from_value(body).unwrap();
        assert!(response.success);

        let data = response.result.unwrap();
        assert_eq!(data.balance.balance, 12.5);
        assert!(data.balance.is_verified());
        assert_eq!(data.balance.trust_score, 90.0);
        assert_eq!(data.miners.len(), 1);
        assert_eq!(data.miners[0].hashrate, 2500.0);
        assert_eq!(data.miners[0].pool, "p");
    }

    #[test]
    fn test_missing_and_malformed_fields_default() {
        let body = serde_json::json!({
            "success": true,
            "result": {
                "balance": { "balance": null, "verified": "no" },
                "miners": [
                    { "hashrate": "not a number", "accepted": -3, "identifier": 7 },
                    "garbage"
                ]
            }
        });

        let data = serde_json::from_value::<UserResponse>(body)
            .unwrap()
            .result
            .unwrap();

        assert_eq!(data.balance.balance, 0.0);
        assert!(!data.balance.is_verified());
        assert_eq!(data.balance.trust_score, 0.0);
        assert_eq!(data.miners.len(), 1);

        let miner = &data.miners[0];
        assert_eq!(miner.hashrate, 0.0);
        assert_eq!(miner.accepted, 0);
        assert_eq!(miner.identifier, "7");
        assert_eq!(miner.software, "");
    }

    #[test]
    fn test_null_balance_defaults_instead_of_failing() {
        let body = serde_json::json!({ "success": true, "result": { "balance": null } });
        let data = serde_json::from_value::<UserResponse>(body)
            .unwrap()
            .result
            .unwrap();

        assert_eq!(data.balance, BalanceInfo::default());
        assert!(data.miners.is_empty());

        let body = serde_json::json!({ "success": true, "result": { "balance": "lots", "miners": 3 } });
        let data = serde_json::from_value::<UserResponse>(body)
            .unwrap()
            .result
            .unwrap();
        assert_eq!(data.balance.balance, 0.0);
    }

    #[test]
    fn test_non_object_result_is_dropped() {
        let body = serde_json::json!({ "success": true, "result": "pending" });
        let response: UserResponse = serde_json::from_value(body).unwrap();
        assert!(response.success);
        assert!(response.result.is_none());
    }

    #[test]
    fn test_failure_envelope_keeps_message() {
        let body = serde_json::json!({ "success": false, "message": "User not found" });
        let response: UserResponse = serde_json::from_value(body).unwrap();
        assert!(!response.success);
        assert!(response.result.is_none());
        assert_eq!(response.message, "User not found");
    }

    #[test]
    fn test_price_field() {
        let body = serde_json::json!({ "Duco price": 0.004, "Active connections": 1200 });
        let price: PriceResponse = serde_json::from_value(body).unwrap();
        assert_eq!(price.duco_price, 0.004);

        let price: PriceResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(price.duco_price, 0.0);
    }
}
