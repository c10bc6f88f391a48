//! Data gateway for WhaleWatch (read-only provider access with retry)
//!
//! Every monitor goes through [`DataGateway`]. It owns the retry/backoff policy and
//! turns provider JSON into the typed snapshots the monitors compare. The actual
//! wire calls sit behind the [`Transport`] trait; [`HttpTransport`] talks to a
//! Solana JSON-RPC (+ DAS) endpoint and DexScreener.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GatewayError;
use crate::utils::MetricsService;

/// Provider call kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// DexScreener pairs for a token (price, liquidity, volume)
    TokenPairs,
    TokenSupply,
    TopHolders,
    /// Recent signatures touching an address
    Signatures,
    /// One parsed transaction, by signature
    Transaction,
    /// Fungible assets created by an authority (DAS `searchAssets`)
    CreatorAssets,
    /// Parsed mint account (authorities, raw supply)
    AccountInfo,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::TokenPairs => "token_pairs",
            Endpoint::TokenSupply => "token_supply",
            Endpoint::TopHolders => "top_holders",
            Endpoint::Signatures => "signatures",
            Endpoint::Transaction => "transaction",
            Endpoint::CreatorAssets => "creator_assets",
            Endpoint::AccountInfo => "account_info",
        }
    }
}

/// One outbound call: endpoint, target address, optional limit
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    pub endpoint: Endpoint,
    pub target: String,
    pub limit: Option<usize>,
}

impl GatewayRequest {
    pub fn new(endpoint: Endpoint, target: &str) -> Self {
        Self {
            endpoint,
            target: target.to_string(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Wire-level provider access. Implementations perform exactly one call per `send`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &GatewayRequest) -> Result<Value, GatewayError>;
}

/// Exponential backoff policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts for one call. Zero is treated as one.
    pub max_retries: u32,
    /// Wait before the first retry; doubled for every retry after that
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Wait before retry `retry` (1-based): `initial_delay * 2^(retry - 1)`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

/// Normalized market data for a token
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub price: f64,
    pub liquidity_usd: f64,
    pub volume_24h: f64,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

/// One entry of the largest-holders list
#[derive(Debug, Clone, PartialEq)]
pub struct Holder {
    pub address: String,
    pub amount: f64,
}

/// A token movement into a wallet, derived from a parsed transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    pub signature: String,
    pub wallet: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Parsed mint account fields we care about
#[derive(Debug, Clone, PartialEq)]
pub struct MintInfo {
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
}

// ============================================
// PROVIDER DTOs
// ============================================

#[derive(Debug, Deserialize)]
struct PairsResponse {
    #[serde(default)]
    pairs: Option<Vec<PairDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairDto {
    #[serde(default)]
    price_usd: Option<String>,
    #[serde(default)]
    liquidity: Option<LiquidityDto>,
    #[serde(default)]
    volume: Option<VolumeDto>,
    #[serde(default)]
    base_token: Option<BaseTokenDto>,
}

#[derive(Debug, Deserialize)]
struct LiquidityDto {
    #[serde(default)]
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VolumeDto {
    #[serde(default)]
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BaseTokenDto {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcValue<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiTokenAmountDto {
    #[serde(default)]
    ui_amount: Option<f64>,
    #[serde(default)]
    ui_amount_string: Option<String>,
}

impl UiTokenAmountDto {
    fn value(&self) -> Option<f64> {
        self.ui_amount_string
            .as_deref()
            .and_then(|s| s.parse().ok())
            .or(self.ui_amount)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LargestAccountDto {
    address: String,
    #[serde(flatten)]
    amount: UiTokenAmountDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureDto {
    signature: String,
    #[serde(default)]
    err: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionDto {
    #[serde(default)]
    block_time: Option<i64>,
    #[serde(default)]
    meta: Option<TransactionMetaDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionMetaDto {
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    pre_token_balances: Vec<TokenBalanceDto>,
    #[serde(default)]
    post_token_balances: Vec<TokenBalanceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalanceDto {
    mint: String,
    #[serde(default)]
    owner: Option<String>,
    ui_token_amount: UiTokenAmountDto,
}

#[derive(Debug, Deserialize)]
struct AssetSearchDto {
    #[serde(default)]
    items: Vec<AssetDto>,
}

#[derive(Debug, Deserialize)]
struct AssetDto {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AccountDataDto {
    data: ParsedDataDto,
}

#[derive(Debug, Deserialize)]
struct ParsedDataDto {
    parsed: ParsedInfoDto,
}

#[derive(Debug, Deserialize)]
struct ParsedInfoDto {
    info: MintInfoDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MintInfoDto {
    #[serde(default)]
    mint_authority: Option<String>,
    #[serde(default)]
    freeze_authority: Option<String>,
}

fn decode<T: for<'de> Deserialize<'de>>(endpoint: Endpoint, value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| {
        GatewayError::Permanent(format!("malformed {} response: {}", endpoint.as_str(), e))
    })
}

/// Retrying front door to the data providers
pub struct DataGateway {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    metrics: Option<Arc<MetricsService>>,
}

impl DataGateway {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsService>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Issue a request, retrying rate-limit and transient failures with
    /// exponential backoff. Permanent failures are returned immediately.
    pub async fn request(&self, request: GatewayRequest) -> Result<Value, GatewayError> {
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            let started = Instant::now();
            let result = self.transport.send(&request).await;
            self.record(&request, &result, started);

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        target: "GATEWAY",
                        "{} {} failed ({}), retrying in {:?} (attempt {}/{})",
                        request.endpoint.as_str(),
                        shorten_address(&request.target, 4),
                        e,
                        delay,
                        attempt,
                        attempts
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.gateway_retries.inc();
                    }
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        target: "GATEWAY",
                        "{} {} failed after {} attempt(s): {}",
                        request.endpoint.as_str(),
                        shorten_address(&request.target, 4),
                        attempt,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    fn record(&self, request: &GatewayRequest, result: &Result<Value, GatewayError>, started: Instant) {
        if let Some(metrics) = &self.metrics {
            let outcome = match result {
                Ok(_) => "ok",
                Err(e) => e.kind(),
            };
            metrics.record_gateway_request(request.endpoint.as_str(), outcome, started.elapsed());
        }
    }

    // ============================================
    // NORMALIZED CALLS
    // ============================================

    /// Price, liquidity and volume from the token's first listed pair
    pub async fn market_snapshot(&self, mint: &str) -> Result<MarketSnapshot, GatewayError> {
        let value = self.request(GatewayRequest::new(Endpoint::TokenPairs, mint)).await?;
        let response: PairsResponse = decode(Endpoint::TokenPairs, value)?;

        let pair = response
            .pairs
            .and_then(|pairs| pairs.into_iter().next())
            .ok_or_else(|| GatewayError::Permanent(format!("no trading pairs for {}", mint)))?;

        let price = pair
            .price_usd
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok())
            .ok_or_else(|| GatewayError::Permanent(format!("missing priceUsd for {}", mint)))?;

        let (name, symbol) = pair
            .base_token
            .map(|t| (t.name, t.symbol))
            .unwrap_or((None, None));

        Ok(MarketSnapshot {
            price,
            liquidity_usd: pair.liquidity.and_then(|l| l.usd).unwrap_or(0.0),
            volume_24h: pair.volume.and_then(|v| v.h24).unwrap_or(0.0),
            name,
            symbol,
        })
    }

    /// Total supply in UI units
    pub async fn token_supply(&self, mint: &str) -> Result<f64, GatewayError> {
        let value = self.request(GatewayRequest::new(Endpoint::TokenSupply, mint)).await?;
        let supply: RpcValue<UiTokenAmountDto> = decode(Endpoint::TokenSupply, value)?;
        supply
            .value
            .value()
            .ok_or_else(|| GatewayError::Permanent(format!("missing supply amount for {}", mint)))
    }

    /// Largest holders, ordered as the provider returns them (descending)
    pub async fn top_holders(&self, mint: &str, limit: usize) -> Result<Vec<Holder>, GatewayError> {
        let value = self
            .request(GatewayRequest::new(Endpoint::TopHolders, mint).with_limit(limit))
            .await?;
        let accounts: RpcValue<Vec<LargestAccountDto>> = decode(Endpoint::TopHolders, value)?;

        Ok(accounts
            .value
            .into_iter()
            .filter_map(|a| {
                a.amount.value().map(|amount| Holder {
                    address: a.address,
                    amount,
                })
            })
            .take(limit)
            .collect())
    }

    /// Recent token transfers for a mint.
    ///
    /// A transaction that cannot be fetched or decoded is skipped for this scan;
    /// a fetch failure is retried on the next one while it stays inside the
    /// provider's recent window.
    pub async fn recent_transactions(
        &self,
        mint: &str,
        limit: usize,
    ) -> Result<Vec<TransferRecord>, GatewayError> {
        let value = self
            .request(GatewayRequest::new(Endpoint::Signatures, mint).with_limit(limit))
            .await?;
        let signatures: Vec<SignatureDto> = decode(Endpoint::Signatures, value)?;

        let mut transfers = Vec::new();
        for sig in signatures.into_iter().filter(|s| s.err.is_none()) {
            let value = match self
                .request(GatewayRequest::new(Endpoint::Transaction, &sig.signature))
                .await
            {
                Ok(v) => v,
                Err(e) => {
                    debug!(target: "GATEWAY", "Skipping transaction {}: {}", sig.signature, e);
                    continue;
                }
            };

            if value.is_null() {
                continue;
            }

            let tx: TransactionDto = match decode(Endpoint::Transaction, value) {
                Ok(tx) => tx,
                Err(e) => {
                    warn!(target: "GATEWAY", "Skipping transaction {}: {}", sig.signature, e);
                    continue;
                }
            };
            if let Some(transfer) = parse_transfer(&sig.signature, mint, &tx) {
                transfers.push(transfer);
            }
        }

        Ok(transfers)
    }

    /// Fungible token ids authored by `creator`
    pub async fn creator_tokens(&self, creator: &str) -> Result<Vec<String>, GatewayError> {
        let value = self
            .request(GatewayRequest::new(Endpoint::CreatorAssets, creator).with_limit(100))
            .await?;
        let search: AssetSearchDto = decode(Endpoint::CreatorAssets, value)?;
        Ok(search.items.into_iter().map(|a| a.id).collect())
    }

    /// Mint and freeze authority of a token
    pub async fn mint_info(&self, mint: &str) -> Result<MintInfo, GatewayError> {
        let value = self.request(GatewayRequest::new(Endpoint::AccountInfo, mint)).await?;
        let account: RpcValue<Option<AccountDataDto>> = decode(Endpoint::AccountInfo, value)?;
        let info = account
            .value
            .ok_or_else(|| GatewayError::Permanent(format!("mint account {} not found", mint)))?
            .data
            .parsed
            .info;

        Ok(MintInfo {
            mint_authority: info.mint_authority,
            freeze_authority: info.freeze_authority,
        })
    }
}

/// Find the wallet that received the most of `mint` in a transaction
fn parse_transfer(signature: &str, mint: &str, tx: &TransactionDto) -> Option<TransferRecord> {
    let meta = tx.meta.as_ref()?;
    if meta.err.is_some() {
        return None;
    }

    let mut deltas: HashMap<&str, f64> = HashMap::new();
    for balance in meta.pre_token_balances.iter().filter(|b| b.mint == mint) {
        if let (Some(owner), Some(amount)) = (balance.owner.as_deref(), balance.ui_token_amount.value()) {
            *deltas.entry(owner).or_insert(0.0) -= amount;
        }
    }
    for balance in meta.post_token_balances.iter().filter(|b| b.mint == mint) {
        if let (Some(owner), Some(amount)) = (balance.owner.as_deref(), balance.ui_token_amount.value()) {
            *deltas.entry(owner).or_insert(0.0) += amount;
        }
    }

    let (wallet, amount) = deltas
        .into_iter()
        .filter(|(_, delta)| *delta > 0.0)
        .max_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.0.cmp(a.0))
        })?;

    let timestamp = tx
        .block_time
        .and_then(|t| Utc.timestamp_opt(t, 0).single())
        .unwrap_or_else(Utc::now);

    Some(TransferRecord {
        signature: signature.to_string(),
        wallet: wallet.to_string(),
        amount,
        timestamp,
    })
}

/// Percent of `supply` held by the `n` largest holders
pub fn top_holder_concentration(holders: &[Holder], supply: f64, n: usize) -> Option<f64> {
    if supply <= 0.0 || !supply.is_finite() {
        return None;
    }
    let mut amounts: Vec<f64> = holders.iter().map(|h| h.amount).collect();
    amounts.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let top: f64 = amounts.iter().take(n).sum();
    Some(top / supply * 100.0)
}

/// Shorten an address for display
pub fn shorten_address(address: &str, chars: usize) -> String {
    let count = address.chars().count();
    if count <= chars * 2 {
        return address.to_string();
    }
    let head: String = address.chars().take(chars).collect();
    let tail: String = address.chars().skip(count - chars).collect();
    format!("{}...{}", head, tail)
}

// ============================================
// HTTP TRANSPORT
// ============================================

/// Solana JSON-RPC + DexScreener over HTTP
pub struct HttpTransport {
    client: reqwest::Client,
    rpc_url: String,
    dexscreener_url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.gateway_timeout)
            .build()?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            dexscreener_url: config.dexscreener_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value, GatewayError> {
        let response = self.client.get(url).send().await.map_err(classify_reqwest)?;
        if let Some(e) = classify_status(response.status()) {
            return Err(e);
        }
        response.json::<Value>().await.map_err(classify_reqwest)
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, GatewayError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(classify_reqwest)?;
        if let Some(e) = classify_status(response.status()) {
            return Err(e);
        }

        let mut envelope = response.json::<Value>().await.map_err(classify_reqwest)?;
        if let Some(error) = envelope.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(classify_rpc_error(method, code, message));
        }

        match envelope.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(GatewayError::Permanent(format!("{}: response has no result", method))),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &GatewayRequest) -> Result<Value, GatewayError> {
        let target = request.target.as_str();
        match request.endpoint {
            Endpoint::TokenPairs => {
                let url = format!("{}/latest/dex/tokens/{}", self.dexscreener_url, target);
                self.get_json(&url).await
            }
            Endpoint::TokenSupply => self.rpc("getTokenSupply", json!([target])).await,
            Endpoint::TopHolders => self.rpc("getTokenLargestAccounts", json!([target])).await,
            Endpoint::Signatures => {
                let limit = request.limit.unwrap_or(25);
                self.rpc("getSignaturesForAddress", json!([target, { "limit": limit }]))
                    .await
            }
            Endpoint::Transaction => {
                self.rpc(
                    "getTransaction",
                    json!([target, { "encoding": "jsonParsed", "maxSupportedTransactionVersion": 0 }]),
                )
                .await
            }
            Endpoint::CreatorAssets => {
                let limit = request.limit.unwrap_or(100);
                self.rpc(
                    "searchAssets",
                    json!({
                        "authorityAddress": target,
                        "tokenType": "fungible",
                        "page": 1,
                        "limit": limit,
                    }),
                )
                .await
            }
            Endpoint::AccountInfo => {
                self.rpc("getAccountInfo", json!([target, { "encoding": "jsonParsed" }]))
                    .await
            }
        }
    }
}

fn classify_status(status: reqwest::StatusCode) -> Option<GatewayError> {
    if status.is_success() {
        None
    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Some(GatewayError::RateLimited(status.to_string()))
    } else if status.is_server_error() {
        Some(GatewayError::Transient(status.to_string()))
    } else {
        Some(GatewayError::Permanent(status.to_string()))
    }
}

fn classify_reqwest(e: reqwest::Error) -> GatewayError {
    if e.is_decode() {
        GatewayError::Permanent(e.to_string())
    } else {
        GatewayError::Transient(e.to_string())
    }
}

fn classify_rpc_error(method: &str, code: i64, message: &str) -> GatewayError {
    let lowered = message.to_ascii_lowercase();
    let text = format!("{}: {} ({})", method, message, code);
    if code == 429 || code == -32429 || lowered.contains("rate limit") || lowered.contains("too many requests") {
        GatewayError::RateLimited(text)
    } else if code == -32603 || code == -32005 {
        GatewayError::Transient(text)
    } else {
        GatewayError::Permanent(text)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport and provider-shaped JSON builders for tests

    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        queued: Mutex<HashMap<(Endpoint, String), VecDeque<Result<Value, GatewayError>>>>,
        sticky: Mutex<HashMap<(Endpoint, String), Result<Value, GatewayError>>>,
        calls: Mutex<Vec<(GatewayRequest, tokio::time::Instant)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// One-shot response, consumed before any sticky response
        pub(crate) fn push(&self, endpoint: Endpoint, target: &str, result: Result<Value, GatewayError>) {
            self.queued
                .lock()
                .entry((endpoint, target.to_string()))
                .or_default()
                .push_back(result);
        }

        /// Response returned whenever nothing is queued
        pub(crate) fn set(&self, endpoint: Endpoint, target: &str, result: Result<Value, GatewayError>) {
            self.sticky.lock().insert((endpoint, target.to_string()), result);
        }

        pub(crate) fn calls_to(&self, endpoint: Endpoint) -> Vec<tokio::time::Instant> {
            self.calls
                .lock()
                .iter()
                .filter(|(r, _)| r.endpoint == endpoint)
                .map(|(_, at)| *at)
                .collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &GatewayRequest) -> Result<Value, GatewayError> {
            self.calls
                .lock()
                .push((request.clone(), tokio::time::Instant::now()));

            let key = (request.endpoint, request.target.clone());
            if let Some(result) = self.queued.lock().get_mut(&key).and_then(|q| q.pop_front()) {
                return result;
            }
            self.sticky
                .lock()
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Err(GatewayError::Permanent(format!("unscripted {:?}", key))))
        }
    }

    pub(crate) fn gateway(transport: Arc<ScriptedTransport>) -> DataGateway {
        DataGateway::new(
            transport,
            RetryPolicy {
                max_retries: 3,
                initial_delay: Duration::from_secs(1),
            },
        )
    }

    pub(crate) fn pairs_json(price: f64, liquidity: f64, volume: f64) -> Value {
        json!({
            "pairs": [{
                "dexId": "raydium",
                "pairAddress": "PAIR1111",
                "baseToken": { "name": "Test Token", "symbol": "TEST" },
                "priceUsd": price.to_string(),
                "liquidity": { "usd": liquidity },
                "volume": { "h24": volume }
            }]
        })
    }

    pub(crate) fn supply_json(supply: f64) -> Value {
        json!({ "value": { "amount": "0", "decimals": 0, "uiAmount": supply, "uiAmountString": supply.to_string() } })
    }

    pub(crate) fn holders_json(holders: &[(&str, f64)]) -> Value {
        let value: Vec<Value> = holders
            .iter()
            .map(|(address, amount)| {
                json!({ "address": address, "amount": "0", "decimals": 0, "uiAmount": amount, "uiAmountString": amount.to_string() })
            })
            .collect();
        json!({ "value": value })
    }

    pub(crate) fn signatures_json(signatures: &[&str]) -> Value {
        let value: Vec<Value> = signatures
            .iter()
            .map(|s| json!({ "signature": s, "slot": 1, "err": null, "blockTime": 1_700_000_000 }))
            .collect();
        Value::Array(value)
    }

    pub(crate) fn transfer_json(mint: &str, from: &str, to: &str, amount: f64) -> Value {
        json!({
            "blockTime": 1_700_000_000,
            "meta": {
                "err": null,
                "preTokenBalances": [
                    { "accountIndex": 1, "mint": mint, "owner": from, "uiTokenAmount": { "uiAmount": 1_000_000.0, "uiAmountString": "1000000" } },
                    { "accountIndex": 2, "mint": mint, "owner": to, "uiTokenAmount": { "uiAmount": 0.0, "uiAmountString": "0" } }
                ],
                "postTokenBalances": [
                    { "accountIndex": 1, "mint": mint, "owner": from, "uiTokenAmount": { "uiAmount": 1_000_000.0 - amount, "uiAmountString": (1_000_000.0 - amount).to_string() } },
                    { "accountIndex": 2, "mint": mint, "owner": to, "uiTokenAmount": { "uiAmount": amount, "uiAmountString": amount.to_string() } }
                ]
            }
        })
    }

    pub(crate) fn assets_json(ids: &[&str]) -> Value {
        let items: Vec<Value> = ids.iter().map(|id| json!({ "id": id, "interface": "FungibleToken" })).collect();
        json!({ "total": ids.len(), "items": items })
    }

    pub(crate) fn mint_info_json(mint_authority: Option<&str>, freeze_authority: Option<&str>) -> Value {
        json!({
            "value": {
                "data": {
                    "parsed": {
                        "info": {
                            "mintAuthority": mint_authority,
                            "freezeAuthority": freeze_authority,
                            "supply": "1000000000",
                            "decimals": 6
                        },
                        "type": "mint"
                    },
                    "program": "spl-token"
                }
            }
        })
    }
}
