//! Unit conversion and positional-parameter coercion
//!
//! The wallet service accounts in integral satoshis; the RPC surface speaks
//! fractional BTC. Conversion to satoshis truncates, never rounds up -
//! rounding-sensitive callers must pre-round.

use serde_json::Value;

use crate::error::RpcError;

pub const SATOSHIS_PER_BTC: f64 = 100_000_000.0;

/// Exact division by 1e8.
pub fn to_btc(satoshis: i64) -> f64 {
    satoshis as f64 / SATOSHIS_PER_BTC
}

/// Truncation (floor), by definition.
pub fn to_satoshis(btc: f64) -> i64 {
    (btc * SATOSHIS_PER_BTC).floor() as i64
}

/// Protocol clients send both JSON numbers and numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Absent uses the default; anything non-numeric is a type mismatch.
pub fn coerce_number(value: Option<&Value>, default: f64) -> Result<f64, RpcError> {
    match present(value) {
        None => Ok(default),
        Some(v) => {
            as_number(v).ok_or_else(|| RpcError::TypeMismatch("value is not a number".into()))
        }
    }
}

/// Like [`coerce_number`], but rejects values with a fractional remainder.
pub fn coerce_integer(value: Option<&Value>, default: i64) -> Result<i64, RpcError> {
    let number = coerce_number(value, default as f64)?;
    if number.fract() != 0.0 {
        return Err(RpcError::TypeMismatch("value is type real, expected int".into()));
    }
    Ok(number as i64)
}

/// Confirmation thresholds: absent defaults to 1, only the literal values
/// 0 and 1 are supported. The wallet service has no notion of per-call
/// confirmation depth beyond confirmed/total.
pub fn coerce_confirmations(value: Option<&Value>) -> Result<u32, RpcError> {
    match present(value) {
        None => Ok(1),
        Some(v) => match as_number(v) {
            Some(n) if n == 0.0 => Ok(0),
            Some(n) if n == 1.0 => Ok(1),
            _ => Err(RpcError::UnsupportedValue),
        },
    }
}
