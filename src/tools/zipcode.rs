// ABOUTME: ZipcodeTool - looks up Brazilian addresses by postal code (CEP) via ViaCEP.
// ABOUTME: Results are kept in a TTL cache keyed by the eight CEP digits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{FileCache, TtlCache};
use crate::config::Config;
use crate::error::ToolError;
use crate::llm::http_client;
use crate::tool::{Args, Tool, optional_str};

const VIACEP_BASE_URL: &str = "https://viacep.com.br";
const CACHE_PREFIX: &str = "cep";

/// Address as returned by ViaCEP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub cep: String,
    #[serde(default, rename = "logradouro")]
    pub street: String,
    #[serde(default, rename = "complemento")]
    pub complement: String,
    #[serde(default, rename = "bairro")]
    pub neighborhood: String,
    #[serde(default, rename = "localidade")]
    pub city: String,
    #[serde(default, rename = "uf")]
    pub state: String,
    #[serde(default)]
    pub ibge: String,
    #[serde(default)]
    pub ddd: String,
}

impl Address {
    fn render(&self) -> String {
        let mut lines = vec![format!("Address for CEP {}:", self.cep)];
        if !self.street.is_empty() {
            lines.push(format!("Street: {}", self.street));
        }
        if !self.complement.is_empty() {
            lines.push(format!("Complement: {}", self.complement));
        }
        if !self.neighborhood.is_empty() {
            lines.push(format!("Neighborhood: {}", self.neighborhood));
        }
        lines.push(format!("City: {} - {}", self.city, self.state));
        lines.join("\n")
    }
}

/// Normalise a user-supplied CEP to its eight digits.
///
/// Hyphens and spaces are ignored; anything else must be a digit.
pub fn normalize_cep(raw: &str) -> Result<String, ToolError> {
    let digits: String = raw.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect();
    if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ToolError::InvalidArgument(format!(
            "zipcode must have 8 digits, got '{}'",
            raw
        )));
    }
    Ok(digits)
}

/// Format eight CEP digits as `NNNNN-NNN`.
pub fn format_cep(digits: &str) -> String {
    if digits.len() == 8 {
        format!("{}-{}", &digits[..5], &digits[5..])
    } else {
        digits.to_string()
    }
}

/// Postal code lookup tool.
pub struct ZipcodeTool {
    base_url: String,
    http: reqwest::Client,
    cache: Arc<dyn TtlCache>,
}

impl ZipcodeTool {
    pub fn new(cache: Arc<dyn TtlCache>, timeout: Duration) -> Self {
        Self {
            base_url: VIACEP_BASE_URL.to_string(),
            http: http_client(timeout),
            cache,
        }
    }

    /// Tool backed by a [`FileCache`] in the configured cache directory.
    pub fn from_config(config: &Config) -> Self {
        let cache = FileCache::new(&config.cache_dir, CACHE_PREFIX, config.cache_ttl);
        Self::new(Arc::new(cache), config.request_timeout)
    }

    /// Override the ViaCEP base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Resolve a CEP to an address, consulting the cache first.
    pub async fn lookup(&self, raw: &str) -> Result<Address, ToolError> {
        let digits = normalize_cep(raw)?;

        match self.cache.get(&digits).await {
            Ok(Some(cached)) => match serde_json::from_str::<Address>(&cached) {
                Ok(address) => {
                    debug!(cep = %digits, "address served from cache");
                    return Ok(address);
                }
                Err(e) => warn!(cep = %digits, error = %e, "ignoring unreadable cache entry"),
            },
            Ok(None) => {}
            Err(e) => warn!(cep = %digits, error = %e, "cache read failed, querying ViaCEP"),
        }

        let url = format!("{}/ws/{}/json/", self.base_url, digits);
        info!(cep = %digits, "querying ViaCEP");
        let body: serde_json::Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let not_found = match body.get("erro") {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        };
        if not_found {
            return Err(ToolError::NoContent(format!(
                "no address found for CEP {}",
                format_cep(&digits)
            )));
        }

        let mut address: Address = serde_json::from_value(body)
            .map_err(|e| ToolError::NoContent(format!("unexpected ViaCEP payload: {}", e)))?;
        if address.cep.is_empty() {
            address.cep = format_cep(&digits);
        }

        let encoded = serde_json::to_string(&address)
            .map_err(|e| ToolError::Cache(e.into()))?;
        self.cache
            .put(&digits, &encoded)
            .await
            .map_err(ToolError::Cache)?;

        Ok(address)
    }
}

#[async_trait]
impl Tool for ZipcodeTool {
    fn name(&self) -> &str {
        "zipcode_lookup"
    }

    fn description(&self) -> &str {
        "Look up Brazilian addresses by postal code (CEP)."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "zipcode": {
                    "type": "string",
                    "description": "01310-100"
                }
            },
            "required": ["zipcode"]
        })
    }

    async fn execute(&self, args: Args) -> Result<String, ToolError> {
        let raw = match optional_str(&args, "zipcode")? {
            Some(z) => z,
            None => optional_str(&args, "zip_code")?
                .ok_or_else(|| ToolError::MissingArgument("zipcode".to_string()))?,
        };
        Ok(self.lookup(raw).await?.render())
    }
}
