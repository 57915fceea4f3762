//! Method handlers - one per locally implemented RPC method
//!
//! Each handler coerces its positional parameters, consults the session,
//! calls the wallet service, and returns a protocol-shaped value. All
//! failures leave as [`RpcError`]; the registry converts them to wire
//! errors.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use bitcoin::bip32::{Xpriv, Xpub};
use bitcoin::secp256k1::Secp256k1;

use crate::amount::{coerce_confirmations, coerce_integer, coerce_number, to_btc, to_satoshis};
use crate::error::RpcError;
use crate::node::Gateway;
use crate::rpc::history;
use crate::rpc::registry::MethodRegistry;
use crate::session::Keychain;

pub fn register_wallet_methods(registry: &mut MethodRegistry, gateway: &Arc<Gateway>) {
    // Standard bitcoind wallet surface.
    registry.register_fn("getnewaddress", gateway, get_new_address);
    registry.register_fn("getbalance", gateway, get_balance);
    registry.register_fn("listaccounts", gateway, list_accounts);
    registry.register_fn("listunspent", gateway, list_unspent);
    registry.register_fn("sendtoaddress", gateway, send_to_address);
    registry.register_fn("listtransactions", gateway, list_transactions);
    registry.register_fn("sendmany", gateway, send_many);

    // Wallet-management extensions.
    registry.register_fn("settoken", gateway, set_token);
    registry.register_fn("setkeychain", gateway, set_keychain);
    registry.register_fn("setwallet", gateway, set_wallet);
    registry.register_fn("unlock", gateway, unlock);
}

fn string_param<'a>(params: &'a [Value], index: usize, name: &str) -> Result<&'a str, RpcError> {
    params
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::Misc(format!("missing {name}")))
}

async fn set_token(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    let token = string_param(&params, 0, "token")?.to_string();
    // The token is stored before the profile fetch; a rejected token stays
    // in place for the caller to replace.
    gateway.session.write().await.token = Some(token.clone());
    let user = gateway.api.current_user(&token).await?;
    tracing::info!(username = %user.username, "authenticated");
    Ok(json!(format!(
        "Authenticated as wallet user: {}",
        user.username
    )))
}

async fn set_wallet(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    let id = string_param(&params, 0, "wallet id")?;
    {
        let session = gateway.session.read().await;
        if let Some(wallet) = &session.wallet {
            if wallet.id == id {
                // Re-selecting the active wallet skips the remote fetch.
                return Ok(json!(format!("Set wallet: {id}")));
            }
        }
    }
    let token = gateway.session.read().await.token();
    let wallet = gateway.api.get_wallet(&token, id).await?;
    tracing::info!(wallet = %wallet.id, "wallet selected");
    let confirmation = format!("Set wallet: {}", wallet.id);
    // A previously loaded keychain is left in place; callers re-set it
    // after switching wallets.
    gateway.session.write().await.wallet = Some(wallet);
    Ok(json!(confirmation))
}

async fn set_keychain(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    gateway.session.read().await.require_wallet()?;

    let Some(xprv) = params.first().and_then(Value::as_str) else {
        return Err(RpcError::InvalidKeychain);
    };
    if xprv.is_empty() {
        gateway.session.write().await.set_keychain(None);
        return Ok(json!("Keychain removed"));
    }

    let parsed = Xpriv::from_str(xprv).map_err(|_| RpcError::InvalidKeychain)?;
    // The key must survive a round trip; a partially valid encoding that
    // re-serializes differently is rejected.
    if parsed.to_string() != xprv {
        return Err(RpcError::InvalidKeychain);
    }
    let xpub = Xpub::from_priv(&Secp256k1::new(), &parsed).to_string();

    let token = gateway.session.read().await.token();
    let record = gateway.api.get_keychain(&token, &xpub).await?;

    let mut session = gateway.session.write().await;
    session.require_wallet()?;
    session.set_keychain(Some(Keychain {
        xprv: xprv.to_string(),
        xpub,
        record,
    }));
    Ok(json!("Keychain set"))
}

async fn unlock(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    let otp = string_param(&params, 0, "otp")?;
    let token = gateway.session.read().await.token();
    gateway.api.unlock_session(&token, otp).await?;
    Ok(json!("Unlocked"))
}

async fn get_new_address(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    let (token, wallet_id) = gateway.active_wallet().await?;
    let address = gateway.api.create_address(&token, &wallet_id).await?;
    if params.first().and_then(Value::as_str) == Some("json") {
        return serde_json::to_value(&address).map_err(|e| RpcError::Misc(e.to_string()));
    }
    Ok(json!(address.address))
}

/// Shared by `getbalance` and `listaccounts`.
async fn balance_in_btc(
    gateway: &Gateway,
    account: Option<&Value>,
    confirmations: Option<&Value>,
) -> Result<f64, RpcError> {
    let (token, wallet_id) = gateway.active_wallet().await?;
    let confirmations = coerce_confirmations(confirmations)?;
    if let Some(account) = account.and_then(Value::as_str) {
        // Single-account model: named sub-accounts never hold funds.
        if !account.is_empty() && account != "*" {
            return Ok(to_btc(0));
        }
    }
    // Balances are read fresh; the in-session handle may be stale.
    let wallet = gateway.api.get_wallet(&token, &wallet_id).await?;
    Ok(match confirmations {
        0 => to_btc(wallet.balance),
        _ => to_btc(wallet.confirmed_balance),
    })
}

async fn get_balance(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    let btc = balance_in_btc(&gateway, params.first(), params.get(1)).await?;
    Ok(json!(btc))
}

async fn list_accounts(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    let btc = balance_in_btc(&gateway, None, params.first()).await?;
    Ok(json!({ "": btc }))
}

#[derive(Serialize)]
struct UnspentRecord {
    txid: String,
    vout: u32,
    address: String,
    account: String,
    #[serde(rename = "scriptPubKey")]
    script_pub_key: String,
    #[serde(rename = "redeemScript", skip_serializing_if = "Option::is_none")]
    redeem_script: Option<String>,
    amount: f64,
    confirmations: i64,
}

async fn list_unspent(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    let (token, wallet_id) = gateway.active_wallet().await?;
    let min_conf = coerce_number(params.first(), 1.0)?;
    let max_conf = coerce_number(params.get(1), 9_999_999.0)?;
    // The third positional parameter (address filter) is accepted for
    // protocol compatibility; results are not narrowed by it.

    let unspents = gateway.api.unspents(&token, &wallet_id).await?;
    let records: Vec<UnspentRecord> = unspents
        .into_iter()
        .filter(|u| (u.confirmations as f64) >= min_conf && (u.confirmations as f64) <= max_conf)
        .map(|u| UnspentRecord {
            txid: u.tx_hash,
            vout: u.tx_output_n,
            address: u.address,
            account: String::new(),
            script_pub_key: u.script,
            redeem_script: u.redeem_script,
            amount: to_btc(u.value),
            confirmations: u.confirmations,
        })
        .collect();
    serde_json::to_value(records).map_err(|e| RpcError::Misc(e.to_string()))
}

async fn list_transactions(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    let (token, wallet_id) = gateway.active_wallet().await?;
    // First positional parameter is the account, ignored under the
    // single-account model.
    let count = coerce_integer(params.get(1), 10)?;
    let from = coerce_integer(params.get(2), 0)?;
    if count < 0 {
        return Err(RpcError::InvalidParameter("Negative count".into()));
    }
    if from < 0 {
        return Err(RpcError::InvalidParameter("Negative from".into()));
    }

    let transactions = gateway.api.transactions(&token, &wallet_id).await?;
    let page = history::reconstruct(&wallet_id, &transactions, count as usize, from as usize);
    serde_json::to_value(page).map_err(|e| RpcError::Misc(e.to_string()))
}

/// Shared tail of `sendtoaddress` and `sendmany`: recipients are already
/// in satoshis.
async fn submit_send(
    gateway: &Gateway,
    recipients: BTreeMap<String, i64>,
    comment: Option<&str>,
) -> Result<Value, RpcError> {
    let (token, wallet_id) = gateway.active_wallet().await?;
    let keychain = gateway.session.read().await.require_keychain()?.clone();
    // The wallet is re-fetched so the send sees current remote state.
    let wallet = gateway.api.get_wallet(&token, &wallet_id).await?;
    let result = gateway
        .api
        .send(&token, &wallet.id, &keychain, &recipients, comment)
        .await?;
    tracing::info!(txid = %result.hash, "transaction broadcast");
    Ok(json!(result.hash))
}

async fn send_to_address(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    gateway.session.read().await.require_wallet()?;
    let address = string_param(&params, 0, "address")?.to_string();
    let btc = coerce_number(params.get(1), f64::NAN)
        .map_err(|_| RpcError::InvalidAmount("Invalid amount".into()))?;
    if !btc.is_finite() {
        return Err(RpcError::InvalidAmount("Invalid amount".into()));
    }
    let comment = params.get(2).and_then(Value::as_str);

    let mut recipients = BTreeMap::new();
    recipients.insert(address, to_satoshis(btc));

    // This path replaces upstream text with fixed messages.
    submit_send(&gateway, recipients, comment)
        .await
        .map_err(|err| match err {
            RpcError::InvalidAddress(_) => RpcError::InvalidAddress("Invalid Bitcoin address".into()),
            RpcError::InvalidAmount(_) => RpcError::InvalidAmount("Invalid amount".into()),
            other => other,
        })
}

async fn send_many(gateway: Arc<Gateway>, params: Vec<Value>) -> Result<Value, RpcError> {
    gateway.session.read().await.require_wallet()?;

    let recipients_input = params.first().cloned().unwrap_or(Value::Null);
    let parsed = match &recipients_input {
        Value::String(s) => serde_json::from_str::<Value>(s)
            .map_err(|_| RpcError::Misc(format!("Error parsing JSON:{s}")))?,
        Value::Object(_) => recipients_input.clone(),
        other => return Err(RpcError::Misc(format!("Error parsing JSON:{other}"))),
    };
    let object = parsed
        .as_object()
        .ok_or_else(|| RpcError::Misc(format!("Error parsing JSON:{parsed}")))?;

    let mut recipients = BTreeMap::new();
    for (address, amount) in object {
        let btc = amount
            .as_f64()
            .ok_or_else(|| RpcError::InvalidAmount(format!("invalid amount for {address}")))?;
        recipients.insert(address.clone(), to_satoshis(btc));
    }
    let comment = params.get(1).and_then(Value::as_str);

    // Upstream error messages pass through verbatim on this path.
    submit_send(&gateway, recipients, comment).await
}
