use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::{Client, Method};
use scraper::Selector;
use tracing::{debug, info};
use url::Url;

use crate::config::{Settings, SEARCH_FORM_NAME};
use crate::error::{Result, ScrapeError};
use crate::parser::Document;

static FORM_INPUT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[name]").unwrap());

/// Anything that can hand back the HTML behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Address fields of the record search form.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub street_number: String,
    pub unit_number: String,
    pub street_direction: String,
    pub street_name: String,
    pub street_type: String,
    pub post_direction: String,
    pub city: String,
}

impl SearchQuery {
    fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("Situs_Street_Number", self.street_number.as_str()),
            ("Situs_Street_Direction", self.street_direction.as_str()),
            ("Situs_Street_Name", self.street_name.as_str()),
            ("Situs_Street_Type", self.street_type.as_str()),
            ("Situs_Street_Post_Dir", self.post_direction.as_str()),
            ("Situs_Unit_Number", self.unit_number.as_str()),
            ("Situs_City", self.city.as_str()),
        ]
    }
}

/// Live HTTP access. Keeps cookies so the search form behaves like a browser session.
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(settings.user_agent.clone())
            .timeout(settings.fetch_timeout())
            .build()
            .map_err(|source| ScrapeError::Http {
                url: settings.base_url.clone(),
                source,
            })?;
        Ok(HttpFetcher {
            client,
            timeout_secs: settings.fetch_timeout_secs,
        })
    }

    fn map_err(&self, url: &str, source: reqwest::Error) -> ScrapeError {
        if source.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            ScrapeError::Http {
                url: url.to_string(),
                source,
            }
        }
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<String> {
        let response = request.send().await.map_err(|e| self.map_err(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|e| self.map_err(url, e))
    }

    /// Open the search page, fill in the address form and return the result page.
    pub async fn search(&self, settings: &Settings, query: &SearchQuery) -> Result<String> {
        let search_url = settings.search_url();
        info!("Opening search page: {}", search_url);
        let page = self.fetch(&search_url).await?;

        let form = SearchForm::find(&page, &search_url)?;
        let mut fields = form.defaults;
        for (name, value) in query.fields() {
            fields.retain(|(n, _)| n != name);
            fields.push((name.to_string(), value.to_string()));
        }

        let target = form.action.to_string();
        info!("Submitting search form to {}", target);
        let request = if form.method == Method::GET {
            self.client.get(form.action).query(&fields)
        } else {
            self.client.post(form.action).form(&fields)
        };
        self.send(&target, request).await
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        self.send(url, self.client.get(url)).await
    }
}

/// Where and how the search form posts, plus the values it already carries.
struct SearchForm {
    action: Url,
    method: Method,
    defaults: Vec<(String, String)>,
}

impl SearchForm {
    fn find(page: &str, page_url: &str) -> Result<Self> {
        let not_found = || ScrapeError::FormNotFound {
            name: SEARCH_FORM_NAME.to_string(),
            url: page_url.to_string(),
        };
        let invalid = |reason: String| ScrapeError::InvalidUrl {
            url: page_url.to_string(),
            reason,
        };

        let form_sel = Selector::parse(&format!("form[name='{SEARCH_FORM_NAME}']")).map_err(|e| {
            ScrapeError::Selector {
                path: SEARCH_FORM_NAME.to_string(),
                reason: e.to_string(),
            }
        })?;
        let doc = Document::parse(page);
        let form = doc.element(&form_sel).ok_or_else(not_found)?;

        let base = Url::parse(page_url).map_err(|e| invalid(e.to_string()))?;
        let action = base
            .join(form.value().attr("action").unwrap_or(""))
            .map_err(|e| invalid(e.to_string()))?;
        let method = match form.value().attr("method") {
            Some(m) if m.eq_ignore_ascii_case("get") => Method::GET,
            _ => Method::POST,
        };

        let defaults = form
            .select(&FORM_INPUT)
            .filter(|input| {
                !matches!(
                    input.value().attr("type").map(str::to_ascii_lowercase).as_deref(),
                    Some("submit" | "button" | "image" | "reset" | "checkbox" | "radio")
                )
            })
            .filter_map(|input| {
                let name = input.value().attr("name")?;
                let value = input.value().attr("value").unwrap_or("");
                Some((name.to_string(), value.to_string()))
            })
            .collect();

        Ok(SearchForm {
            action,
            method,
            defaults,
        })
    }
}

/// Serves pages from memory. Backs offline parsing of saved pages.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, body: impl Into<String>) {
        self.pages.insert(url.into(), body.into());
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"<html><body>
        <form name="homeind" action="RecSearch.asp" method="post">
          <input type="hidden" name="Search_Type" value="addr">
          <input type="text" name="Situs_Street_Number" value="">
          <input type="submit" name="go" value="Search">
        </form></body></html>"#;

    #[test]
    fn finds_form_action_and_hidden_fields() {
        let form = SearchForm::find(SEARCH_PAGE, "http://www.bcpa.net/RecAddr.asp").unwrap();
        assert_eq!(form.action.as_str(), "http://www.bcpa.net/RecSearch.asp");
        assert_eq!(form.method, Method::POST);
        assert_eq!(
            form.defaults,
            vec![
                ("Search_Type".to_string(), "addr".to_string()),
                ("Situs_Street_Number".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn missing_form_is_fatal() {
        let err = SearchForm::find("<html><body></body></html>", "http://www.bcpa.net/RecAddr.asp")
            .err()
            .unwrap();
        assert!(matches!(err, ScrapeError::FormNotFound { .. }));
    }

    #[tokio::test]
    async fn static_fetcher_misses_are_404() {
        let mut fetcher = StaticFetcher::new();
        fetcher.insert("http://x/a", "<html></html>");
        assert_eq!(fetcher.fetch("http://x/a").await.unwrap(), "<html></html>");
        let err = fetcher.fetch("http://x/b").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }

    #[test]
    fn query_maps_to_form_field_names() {
        let q = SearchQuery {
            street_number: "1234".into(),
            city: "FL".into(),
            ..Default::default()
        };
        let fields = q.fields();
        assert_eq!(fields[0], ("Situs_Street_Number", "1234"));
        assert_eq!(fields[6], ("Situs_City", "FL"));
    }
}
