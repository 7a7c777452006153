use crate::errors::SourceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

pub const STATUS_API_PATH: &str = "/api/maintenance-status";
pub const STATUS_TEXT_PATH: &str = "/maintenance-status.txt";
pub const STATUS_JSON_PATH: &str = "/maintenance-status.json";

#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub status: u16,
    pub body: String,
}

/// Plain HTTP GET, abstracted so the probe can run without a network.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedBody, SourceError>;
}

#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchedBody, SourceError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(SourceError::unavailable)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(SourceError::unavailable)?;
        Ok(FetchedBody { status, body })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Api,
    EdgeConfig,
    TextFile,
    JsonFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub enabled: bool,
    pub method: ProbeMethod,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    maintenance_mode: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeConfigBody {
    is_in_maintenance_mode: Option<bool>,
    maintenance_mode: Option<bool>,
    maintenance: Option<bool>,
}

/// Best-effort remote lookup of the maintenance flag.
#[derive(Clone)]
pub struct RemoteStatusProbe {
    fetcher: Arc<dyn StatusFetcher>,
    base_url: String,
    edge_config_url: Option<String>,
}

impl RemoteStatusProbe {
    pub fn new(fetcher: Arc<dyn StatusFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            edge_config_url: None,
        }
    }

    pub fn with_edge_config(mut self, url: impl Into<String>) -> Self {
        self.edge_config_url = Some(url.into());
        self
    }

    /// Tries every method in order and returns the first definitive answer.
    pub async fn check(&self) -> Option<ProbeOutcome> {
        let mut methods = vec![ProbeMethod::Api];
        if self.edge_config_url.is_some() {
            methods.push(ProbeMethod::EdgeConfig);
        }
        methods.extend([ProbeMethod::TextFile, ProbeMethod::JsonFile]);

        for method in methods {
            match self.try_method(method).await {
                Ok(enabled) => return Some(ProbeOutcome { enabled, method }),
                Err(err) => debug!("probe {method:?} inconclusive: {err}"),
            }
        }
        None
    }

    async fn try_method(&self, method: ProbeMethod) -> Result<bool, SourceError> {
        let url = match method {
            ProbeMethod::Api => format!("{}{STATUS_API_PATH}", self.base_url),
            ProbeMethod::EdgeConfig => self
                .edge_config_url
                .clone()
                .ok_or_else(|| SourceError::unavailable("no edge config url"))?,
            ProbeMethod::TextFile => format!("{}{STATUS_TEXT_PATH}", self.base_url),
            ProbeMethod::JsonFile => format!("{}{STATUS_JSON_PATH}", self.base_url),
        };

        let fetched = self.fetcher.get(&url).await?;
        if !(200..300).contains(&fetched.status) {
            return Err(SourceError::unavailable(format!(
                "{url} returned {}",
                fetched.status
            )));
        }

        match method {
            ProbeMethod::Api | ProbeMethod::JsonFile => {
                let body: StatusBody = serde_json::from_str(&fetched.body)?;
                Ok(body.maintenance_mode)
            }
            ProbeMethod::EdgeConfig => parse_edge_config(&fetched.body),
            ProbeMethod::TextFile => parse_status_text(&fetched.body),
        }
    }
}

fn parse_edge_config(body: &str) -> Result<bool, SourceError> {
    let body: EdgeConfigBody = serde_json::from_str(body)?;
    let flags = [body.is_in_maintenance_mode, body.maintenance_mode, body.maintenance];
    if flags.iter().all(Option::is_none) {
        return Err(SourceError::malformed("edge config has no maintenance flag"));
    }
    Ok(flags.contains(&Some(true)))
}

pub fn parse_status_text(body: &str) -> Result<bool, SourceError> {
    match body.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(SourceError::malformed(format!("unexpected status text {other:?}"))),
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::HashMap;

    /// Serves canned bodies by URL; unknown URLs fail like a dead network.
    #[derive(Default)]
    pub struct FakeFetcher {
        pub routes: HashMap<String, (u16, String)>,
    }

    impl FakeFetcher {
        pub fn route(mut self, url: &str, status: u16, body: &str) -> Self {
            self.routes.insert(url.to_string(), (status, body.to_string()));
            self
        }
    }

    #[async_trait]
    impl StatusFetcher for FakeFetcher {
        async fn get(&self, url: &str) -> Result<FetchedBody, SourceError> {
            self.routes
                .get(url)
                .map(|(status, body)| FetchedBody {
                    status: *status,
                    body: body.clone(),
                })
                .ok_or_else(|| SourceError::unavailable(format!("connection refused: {url}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeFetcher;
    use super::*;

    const BASE: &str = "http://site.test";

    fn probe(fetcher: FakeFetcher) -> RemoteStatusProbe {
        RemoteStatusProbe::new(Arc::new(fetcher), format!("{BASE}/"))
    }

    #[tokio::test]
    async fn api_answer_wins() {
        let fetcher = FakeFetcher::default()
            .route(&format!("{BASE}{STATUS_API_PATH}"), 200, r#"{"maintenanceMode":true}"#)
            .route(&format!("{BASE}{STATUS_TEXT_PATH}"), 200, "false");

        let outcome = probe(fetcher).check().await.unwrap();
        assert!(outcome.enabled);
        assert_eq!(outcome.method, ProbeMethod::Api);
    }

    #[tokio::test]
    async fn unreachable_api_falls_through_to_text_file() {
        let fetcher =
            FakeFetcher::default().route(&format!("{BASE}{STATUS_TEXT_PATH}"), 200, " TRUE\n");

        let outcome = probe(fetcher).check().await.unwrap();
        assert!(outcome.enabled);
        assert_eq!(outcome.method, ProbeMethod::TextFile);
    }

    #[tokio::test]
    async fn error_status_and_garbage_are_inconclusive() {
        let fetcher = FakeFetcher::default()
            .route(&format!("{BASE}{STATUS_API_PATH}"), 500, r#"{"maintenanceMode":true}"#)
            .route(&format!("{BASE}{STATUS_TEXT_PATH}"), 200, "<html>not found</html>")
            .route(&format!("{BASE}{STATUS_JSON_PATH}"), 200, r#"{"maintenanceMode":false}"#);

        let outcome = probe(fetcher).check().await.unwrap();
        assert!(!outcome.enabled);
        assert_eq!(outcome.method, ProbeMethod::JsonFile);
    }

    #[tokio::test]
    async fn nothing_reachable_yields_none() {
        assert!(probe(FakeFetcher::default()).check().await.is_none());
    }

    #[tokio::test]
    async fn edge_config_accepts_any_flag_name() {
        let fetcher = FakeFetcher::default()
            .route("https://edge.test/cfg", 200, r#"{"isInMaintenanceMode":true}"#);

        let outcome = probe(fetcher)
            .with_edge_config("https://edge.test/cfg")
            .check()
            .await
            .unwrap();
        assert!(outcome.enabled);
        assert_eq!(outcome.method, ProbeMethod::EdgeConfig);
    }

    #[test]
    fn edge_config_without_flag_is_malformed() {
        assert!(parse_edge_config(r#"{"other":1}"#).is_err());
        assert!(!parse_edge_config(r#"{"maintenance":false}"#).unwrap());
    }
}
