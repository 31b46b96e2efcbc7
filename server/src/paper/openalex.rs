use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::PaperConfig;
use crate::error::PaperError;
use crate::paper::abstract_index::restore_abstract;
use crate::paper::doi::clean_doi;

/// The subset of an OpenAlex work record the lookup reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Work {
    pub title: Option<String>,
    pub authorships: Option<Vec<Authorship>>,
    pub cited_by_count: Option<u64>,
    pub publication_year: Option<i64>,
    pub locations: Option<Vec<Location>>,
    pub open_access: Option<OpenAccess>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    pub language: Option<String>,
    pub abstract_inverted_index: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Authorship {
    pub author: Option<Author>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Author {
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Location {
    pub source: Option<Source>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Source {
    pub display_name: Option<String>,
    pub host_organization_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpenAccess {
    pub is_oa: Option<bool>,
    pub oa_url: Option<String>,
}

/// Publication year, or the literal `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Year {
    Known(i64),
    Unknown(&'static str),
}

/// Normalized record returned by `GET /api/paper-info`.
#[derive(Debug, Clone, Serialize)]
pub struct PaperInfo {
    pub source: &'static str,
    pub title: String,
    pub doi: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub referencecount: u64,
    pub author: String,
    pub year: Year,
    pub url: String,
    pub location: String,
    pub scihub_url: String,
    pub is_oa: bool,
    pub oa_url: Option<String>,
    #[serde(rename = "type")]
    pub work_type: String,
    pub language: String,
}

impl PaperInfo {
    /// Flatten an OpenAlex work, filling defaults for absent fields.
    pub fn from_work(doi: &str, work: Work) -> Self {
        let author = work
            .authorships
            .unwrap_or_default()
            .into_iter()
            .map(|a| {
                non_empty(a.author.and_then(|a| a.display_name))
                    .unwrap_or_else(|| "Unknown".to_string())
            })
            .collect::<Vec<_>>()
            .join(", ");

        let location = work
            .locations
            .unwrap_or_default()
            .into_iter()
            .filter_map(|loc| {
                let source = loc.source?;
                non_empty(source.display_name).or_else(|| non_empty(source.host_organization_name))
            })
            .collect::<Vec<_>>()
            .join(", ");

        let open_access = work.open_access.unwrap_or_default();
        let doi_url = format!("https://www.doi.org/{}", doi);

        Self {
            source: "openalex",
            title: non_empty(work.title).unwrap_or_else(|| "Unknown".to_string()),
            doi: doi.to_string(),
            abstract_text: restore_abstract(work.abstract_inverted_index.as_ref()),
            referencecount: work.cited_by_count.unwrap_or(0),
            author: if author.is_empty() { "Unknown".to_string() } else { author },
            year: match work.publication_year {
                Some(y) if y != 0 => Year::Known(y),
                _ => Year::Unknown("Unknown"),
            },
            url: doi_url.clone(),
            location: if location.is_empty() { "Not Available".to_string() } else { location },
            scihub_url: doi_url,
            is_oa: open_access.is_oa.unwrap_or(false),
            oa_url: non_empty(open_access.oa_url),
            work_type: non_empty(work.work_type).unwrap_or_else(|| "article".to_string()),
            language: non_empty(work.language).unwrap_or_else(|| "en".to_string()),
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// Thin client for `GET {base}/works/doi:{doi}`.
#[derive(Debug, Clone)]
pub struct OpenAlexClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl OpenAlexClient {
    pub fn new(http: reqwest::Client, config: &PaperConfig) -> Self {
        Self {
            http,
            base_url: config.openalex_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Resolve one DOI. Resolver URL prefixes are stripped first.
    pub async fn lookup(&self, doi: &str) -> Result<PaperInfo, PaperError> {
        let doi = clean_doi(doi);
        tracing::info!("Querying DOI: {}", doi);

        let resp = self
            .http
            .get(format!("{}/works/doi:{}", self.base_url, doi))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAlex request failed for {}: {}", doi, e);
                PaperError::Upstream(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::info!("OpenAlex API error for {}: {}", doi, status);
            return Err(PaperError::NotFound);
        }

        let work: Work = resp.json().await.map_err(|e| {
            tracing::error!("Unreadable OpenAlex record for {}: {}", doi, e);
            PaperError::Upstream(e.to_string())
        })?;

        tracing::info!("Successfully processed DOI: {}", doi);
        Ok(PaperInfo::from_work(&doi, work))
    }
}
