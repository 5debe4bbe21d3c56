use ed25519_dalek::{Signer as _, SigningKey};
use reqwest::{header::CONTENT_TYPE, Client, Method, Url};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use sha2::{Digest as _, Sha256};
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{
    AddressRecord, BalanceRecord, PlatformClient, PlatformError, SubmitResult, TransactionRecord,
    WalletRecord,
};
use crate::config::HttpConfig;
use crate::envelope::{ContractCallParams, EstimateFeeParams, MessageSignParams};

/// Page size requested from list endpoints. Only the first page is read.
const LIST_LIMIT: &str = "50";

fn allow_insecure_http() -> bool {
    std::env::var("COBOWEB3_ALLOW_INSECURE_HTTP")
        .ok()
        .is_some_and(|v| {
            matches!(
                v.as_str(),
                "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON"
            )
        })
}

fn is_loopback_http(url: &str) -> bool {
    fn host_prefix_ok(s: &str, prefix: &str) -> bool {
        if !s.starts_with(prefix) {
            return false;
        }
        matches!(s.as_bytes().get(prefix.len()), None | Some(b':' | b'/'))
    }
    let u = url.trim();
    host_prefix_ok(u, "http://127.0.0.1")
        || host_prefix_ok(u, "http://localhost")
        || host_prefix_ok(u, "http://[::1]")
}

/// Signs outbound API requests with the API private key (an Ed25519 seed, hex-encoded).
pub struct ApiSigner {
    key: SigningKey,
}

impl std::fmt::Debug for ApiSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSigner")
            .field("api_key", &self.api_key())
            .finish_non_exhaustive()
    }
}

impl ApiSigner {
    pub fn from_hex_secret(secret: &SecretString) -> Result<Self, PlatformError> {
        let raw = secret.expose_secret().trim();
        let raw = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes = Zeroizing::new(
            hex::decode(raw)
                .map_err(|e| PlatformError::Config(format!("api private key is not hex: {e}")))?,
        );
        let seed: Zeroizing<[u8; 32]> = Zeroizing::new(
            bytes.as_slice().try_into().map_err(|e| {
                PlatformError::Config(format!("api private key must be 32 bytes: {e}"))
            })?,
        );
        Ok(Self {
            key: SigningKey::from_bytes(&seed),
        })
    }

    /// The public half, hex-encoded; sent as the API key header.
    pub fn api_key(&self) -> String {
        hex::encode(self.key.verifying_key().as_bytes())
    }

    pub fn string_to_sign(method: &str, path: &str, nonce: &str, query: &str, body: &str) -> String {
        [method, path, nonce, query, body].join("|")
    }

    /// Hex signature over `sha256(sha256(string_to_sign))`.
    pub fn sign(&self, method: &str, path: &str, nonce: &str, query: &str, body: &str) -> String {
        let content = Self::string_to_sign(method, path, nonce, query, body);
        let digest = Sha256::digest(Sha256::digest(content.as_bytes()));
        hex::encode(self.key.sign(&digest).to_bytes())
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

#[derive(Debug)]
pub struct HttpPlatform {
    client: Client,
    base_url: Url,
    signer: ApiSigner,
}

/// Parses the base URL, refusing plain http to non-loopback hosts unless `allow_insecure`.
fn check_base_url(base_url: &str, allow_insecure: bool) -> Result<Url, PlatformError> {
    let base = base_url.trim().trim_end_matches('/');
    if !base.starts_with("https://") && !is_loopback_http(base) && !allow_insecure {
        return Err(PlatformError::Config(
            "base_url must use https (or loopback); set COBOWEB3_ALLOW_INSECURE_HTTP=1 to override"
                .into(),
        ));
    }
    let url = Url::parse(base)
        .map_err(|e| PlatformError::Config(format!("invalid base_url {base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(PlatformError::Config(format!("invalid base_url {base}")));
    }
    Ok(url)
}

impl HttpPlatform {
    pub fn new(
        base_url: &str,
        api_private_key: &SecretString,
        http: &HttpConfig,
    ) -> Result<Self, PlatformError> {
        let base_url = check_base_url(base_url, allow_insecure_http())?;
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .connect_timeout(Duration::from_secs(http.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            signer: ApiSigner::from_hex_secret(api_private_key)?,
        })
    }

    pub fn api_key(&self) -> String {
        self.signer.api_key()
    }

    /// Base URL with `segments` appended (each one percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PlatformError::Config("base_url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<T, PlatformError> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let nonce = chrono::Utc::now().timestamp_millis().to_string();
        let body = body.unwrap_or_default();
        let signature = self.signer.sign(
            method.as_str(),
            url.path(),
            &nonce,
            url.query().unwrap_or_default(),
            &body,
        );
        debug!(method = %method, path = %url.path(), "platform request");

        let mut req = self
            .client
            .request(method.clone(), url.clone())
            .header("Biz-Api-Key", self.signer.api_key())
            .header("Biz-Api-Nonce", &nonce)
            .header("Biz-Api-Signature", signature);
        if !body.is_empty() {
            req = req.header(CONTENT_TYPE, "application/json").body(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            warn!(method = %method, path = %url.path(), status = status.as_u16(), "platform request failed");
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        self.send(Method::GET, segments, query, None).await
    }

    async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, PlatformError> {
        let resp: ListResponse<T> = self.get(segments, &[("limit", LIST_LIMIT)]).await?;
        Ok(resp.data)
    }

    async fn post<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, PlatformError> {
        let body = serde_json::to_string(body)?;
        self.send(Method::POST, segments, &[], Some(body)).await
    }
}

impl PlatformClient for HttpPlatform {
    async fn list_enabled_tokens(&self) -> Result<Vec<Value>, PlatformError> {
        self.get_list(&["wallets", "enabled_tokens"]).await
    }

    async fn list_enabled_chains(&self) -> Result<Vec<Value>, PlatformError> {
        self.get_list(&["wallets", "enabled_chains"]).await
    }

    async fn list_wallets(&self) -> Result<Vec<WalletRecord>, PlatformError> {
        self.get_list(&["wallets"]).await
    }

    async fn get_wallet_by_id(&self, wallet_id: &str) -> Result<WalletRecord, PlatformError> {
        self.get(&["wallets", wallet_id], &[]).await
    }

    async fn list_addresses(&self, wallet_id: &str) -> Result<Vec<AddressRecord>, PlatformError> {
        self.get_list(&["wallets", wallet_id, "addresses"]).await
    }

    async fn list_token_balances(
        &self,
        wallet_id: &str,
        address: &str,
    ) -> Result<Vec<BalanceRecord>, PlatformError> {
        self.get_list(&["wallets", wallet_id, "addresses", address, "tokens"])
            .await
    }

    async fn submit_contract_call(
        &self,
        params: &ContractCallParams,
    ) -> Result<SubmitResult, PlatformError> {
        self.post(&["transactions", "contract_call"], params).await
    }

    async fn estimate_fee(&self, params: &EstimateFeeParams) -> Result<Value, PlatformError> {
        self.post(&["transactions", "estimate_fee"], params).await
    }

    async fn get_transaction_by_id(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionRecord, PlatformError> {
        self.get(&["transactions", transaction_id], &[]).await
    }

    async fn submit_message_sign(
        &self,
        params: &MessageSignParams,
    ) -> Result<SubmitResult, PlatformError> {
        self.post(&["transactions", "message_sign"], params).await
    }
}
