//! Redis-over-REST store (Upstash, Vercel KV)
//!
//! Each command is a JSON array POSTed to the base URL with a bearer token;
//! replies are `{"result": ...}` or `{"error": "..."}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::store::CounterStore;
use super::CounterError;

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpstashStore {
    client: Client,
    url: String,
    token: Option<String>,
}

impl UpstashStore {
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self, CounterError> {
        let client = Client::builder()
            .user_agent(concat!("inkpost/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn command(&self, command: Value) -> Result<Value, CounterError> {
        let mut request = self.client.post(&self.url).json(&command);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let reply: Reply = response.json().await?;

        if let Some(error) = reply.error {
            return Err(CounterError::Protocol(format!("{} ({})", error, status)));
        }
        if !status.is_success() {
            return Err(CounterError::Protocol(format!("unexpected status {}", status)));
        }
        Ok(reply.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl CounterStore for UpstashStore {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<u64>>, CounterError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut command = vec![Value::from("MGET")];
        command.extend(keys.iter().map(|k| Value::from(k.as_str())));

        match self.command(Value::Array(command)).await? {
            Value::Array(values) if values.len() == keys.len() => {
                values.iter().map(parse_count).collect()
            }
            other => Err(CounterError::Protocol(format!(
                "MGET returned {} for {} keys",
                other,
                keys.len()
            ))),
        }
    }

    async fn incr(&self, key: &str) -> Result<u64, CounterError> {
        let value = self.command(json!(["INCR", key])).await?;
        parse_count(&value)?
            .ok_or_else(|| CounterError::Protocol("INCR returned null".to_string()))
    }
}

/// Counter values arrive as integers or as the strings Redis stores them as
fn parse_count(value: &Value) -> Result<Option<u64>, CounterError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| CounterError::Protocol(format!("not a counter: {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| CounterError::Protocol(format!("not a counter: {:?}", s))),
        other => Err(CounterError::Protocol(format!("not a counter: {}", other))),
    }
}
