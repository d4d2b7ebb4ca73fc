use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::logging::Logger;

pub mod element;
pub mod user_agent;

/// A semaphore for limiting concurrent requests.
///
/// 限制最多 5 個並發請求，避免被目標網站封禁。
static SEMAPHORE: Lazy<Semaphore> = Lazy::new(|| Semaphore::new(5));

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

/// HTTP 請求失敗時的最大重試次數。
const MAX_RETRIES: usize = 3;

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        // 已安裝過時會回傳 Err，可忽略
        let _ = rustls::crypto::ring::default_provider().install_default();

        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(20))
            // ===== TCP 優化 =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== 連接池 =====
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            // ===== Cookie 和重定向 =====
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            // ===== Headers =====
            .referer(true)
            .user_agent(user_agent::gen_random_ua())
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and deserializes the JSON response into `RES`.
pub async fn get_json<RES: DeserializeOwned>(url: &str) -> Result<RES> {
    let body = get(url, None).await?;

    serde_json::from_str(&body).map_err(|e| {
        anyhow!(
            "Error parsing response JSON from {} because {:?}",
            url,
            e
        )
    })
}

pub async fn get_response(url: &str, headers: Option<header::HeaderMap>) -> Result<Response> {
    send(Method::GET, url, headers).await
}

/// Performs an HTTP GET request and returns the response as text.
///
/// 非 2xx 的回應視為錯誤。
pub async fn get(url: &str, headers: Option<header::HeaderMap>) -> Result<String> {
    let response = get_response(url, headers).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Request to {} returned {}", url, status));
    }

    response
        .text()
        .await
        .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
}

/// Sends an HTTP request with retries on failure.
///
/// 每次失敗後等待 2^attempt 秒再重試，最多 [`MAX_RETRIES`] 次。
async fn send(
    method: Method,
    url: &str,
    headers: Option<header::HeaderMap>,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client()?;
    let mut rb: RequestBuilder = client.request(method, url);
    let mut last_error = String::new();

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    for attempt in 1..=MAX_RETRIES {
        let msg = format!("Attempt {} to send {}", attempt, visit_log);
        let rb_clone = rb
            .try_clone()
            .ok_or_else(|| anyhow!("Failed to clone RequestBuilder"))?;
        let permit = SEMAPHORE.acquire().await;
        let start = Instant::now();
        let res = rb_clone.send().await;
        let elapsed = start.elapsed().as_millis();

        // 請求延遲，避免被目標網站封禁
        tokio::time::sleep(Duration::from_millis(200)).await;
        drop(permit);

        match res {
            Ok(response) => {
                LOGGER.info(format!("{} {} {} ms", msg, response.status(), elapsed));
                return Ok(response);
            }
            Err(why) => {
                last_error = format!("{:?}", why);
                LOGGER.error(format!("{} failed because {:?}. {} ms", msg, why, elapsed));
                if attempt < MAX_RETRIES {
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt as u32))).await;
                }
            }
        }
    }

    Err(anyhow!(
        "Failed to send request to {} after {} attempts; last error: {}",
        url,
        MAX_RETRIES,
        last_error
    ))
}
