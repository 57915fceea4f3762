//! HTTP client for the hosted wallet service
//!
//! Bearer-token auth, JSON bodies. Upstream error text is classified into
//! [`ApiError`] here and nowhere else.

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::{
    AddressRecord, ApiError, KeychainRecord, RemoteTransaction, RemoteUnspent, RemoteWallet,
    SendResult, UserProfile, WalletApi,
};
use crate::session::Keychain;

pub struct HttpWalletApi {
    base: String,
    http: reqwest::Client,
}

impl HttpWalletApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base = base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            base,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base, path)
    }

    async fn request(
        &self,
        token: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let builder = match body {
            Some(ref body) => self.http.post(self.url(path)).json(body),
            None => self.http.get(self.url(path)),
        };
        let response = builder
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Other(format!("wallet service unreachable: {e}")))?;

        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(payload);
        }

        // Error bodies carry {"error": "<message>"}; fall back to the status line.
        let message = payload
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| status.to_string());
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::classify(message),
        })
    }

    fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
        serde_json::from_value(value)
            .map_err(|e| ApiError::Other(format!("unexpected wallet service response: {e}")))
    }
}

#[async_trait::async_trait]
impl WalletApi for HttpWalletApi {
    async fn current_user(&self, token: &str) -> Result<UserProfile, ApiError> {
        let value = self.request(token, "/user/me", None).await?;
        Self::decode(value["user"].clone())
    }

    async fn get_wallet(&self, token: &str, id: &str) -> Result<RemoteWallet, ApiError> {
        let value = self.request(token, &format!("/wallet/{id}"), None).await?;
        Self::decode(value)
    }

    async fn get_keychain(&self, token: &str, xpub: &str) -> Result<KeychainRecord, ApiError> {
        let value = self.request(token, &format!("/keychain/{xpub}"), None).await?;
        Self::decode(value)
    }

    async fn unlock_session(&self, token: &str, otp: &str) -> Result<(), ApiError> {
        self.request(token, "/user/unlock", Some(json!({ "otp": otp })))
            .await?;
        Ok(())
    }

    async fn create_address(
        &self,
        token: &str,
        wallet_id: &str,
    ) -> Result<AddressRecord, ApiError> {
        let value = self
            .request(token, &format!("/wallet/{wallet_id}/address"), Some(json!({})))
            .await?;
        Self::decode(value)
    }

    async fn unspents(&self, token: &str, wallet_id: &str) -> Result<Vec<RemoteUnspent>, ApiError> {
        let value = self
            .request(token, &format!("/wallet/{wallet_id}/unspents"), None)
            .await?;
        Self::decode(value["unspents"].clone())
    }

    async fn transactions(
        &self,
        token: &str,
        wallet_id: &str,
    ) -> Result<Vec<RemoteTransaction>, ApiError> {
        let value = self
            .request(token, &format!("/wallet/{wallet_id}/tx"), None)
            .await?;
        Self::decode(value["transactions"].clone())
    }

    async fn send(
        &self,
        token: &str,
        wallet_id: &str,
        keychain: &Keychain,
        recipients: &BTreeMap<String, i64>,
        message: Option<&str>,
    ) -> Result<SendResult, ApiError> {
        // Two upstream calls: build-and-sign, then broadcast.
        let created = self
            .request(
                token,
                &format!("/wallet/{wallet_id}/tx/create"),
                Some(json!({
                    "recipients": recipients,
                    "keychain": { "xpub": keychain.xpub, "xprv": keychain.xprv },
                })),
            )
            .await?;
        let tx = created
            .get("tx")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Other("wallet service returned no transaction".into()))?;

        let sent = self
            .request(
                token,
                &format!("/wallet/{wallet_id}/tx/send"),
                Some(json!({ "tx": tx, "message": message })),
            )
            .await?;
        Self::decode(sent)
    }
}
