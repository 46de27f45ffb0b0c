use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{info, warn};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::fetch::Fetcher;
use crate::parser::extract::{card, Context};
use crate::parser::Document;
use crate::record::{BuildingCard, Diagnostic};

/// Fetches and reads every building card page, filling the stubs in place.
pub struct CardResolver<F: Fetcher + 'static> {
    fetcher: Arc<F>,
    base: Url,
    concurrency: usize,
    timeout: Duration,
}

impl<F: Fetcher + 'static> CardResolver<F> {
    pub fn new(fetcher: Arc<F>, base_url: &str, concurrency: usize, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| ScrapeError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(CardResolver {
            fetcher,
            base,
            concurrency: concurrency.max(1),
            timeout,
        })
    }

    /// Absolute address of a card page from its escaped stub URL.
    pub fn target(&self, card: &BuildingCard) -> Result<Url> {
        let invalid = |reason: String| ScrapeError::InvalidUrl {
            url: card.card_url.clone(),
            reason,
        };
        let decoded = urlencoding::decode(&card.card_url).map_err(|e| invalid(e.to_string()))?;
        self.base.join(&decoded).map_err(|e| invalid(e.to_string()))
    }

    /// Resolve every stub. Each card fails on its own: a bad URL or a failed
    /// fetch leaves that stub with whatever its URL told us and adds a
    /// diagnostic, while the other cards carry on.
    pub async fn resolve(&self, cards: &mut [BuildingCard], ctx: &Context<'_>) -> Vec<Diagnostic> {
        let mut failures: Vec<(usize, Diagnostic)> = Vec::new();
        if cards.is_empty() {
            return Vec::new();
        }
        info!("Resolving {} building card(s)", cards.len());

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, Result<String>)>(cards.len());

        for (index, stub) in cards.iter_mut().enumerate() {
            let url = match self.target(stub) {
                Ok(url) => url,
                Err(e) => {
                    failures.push((index, card_failure(index, &e)));
                    continue;
                }
            };
            apply_query(stub, &url);

            let fetcher = Arc::clone(&self.fetcher);
            let sem = Arc::clone(&semaphore);
            let tx = tx.clone();
            let timeout = self.timeout;

            tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                let result = fetch_with_timeout(fetcher.as_ref(), url.as_str(), timeout).await;
                let _ = tx.send((index, result)).await;
            });
        }

        // Drop our copy of tx so rx closes when all spawned tasks finish
        drop(tx);

        while let Some((index, result)) = rx.recv().await {
            match result {
                Ok(body) => {
                    let detail = {
                        let doc = Document::parse(&body);
                        card::extract(&doc, ctx)
                    };
                    cards[index].attach(detail);
                }
                Err(e) => failures.push((index, card_failure(index, &e))),
            }
        }

        // arrival order is arbitrary; report in card order
        failures.sort_by_key(|(index, _)| *index);
        failures.into_iter().map(|(_, d)| d).collect()
    }
}

async fn fetch_with_timeout<F: Fetcher + ?Sized>(fetcher: &F, url: &str, timeout: Duration) -> Result<String> {
    match tokio::time::timeout(timeout, fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(ScrapeError::Timeout {
            url: url.to_string(),
            secs: timeout.as_secs(),
        }),
    }
}

fn card_failure(index: usize, err: &ScrapeError) -> Diagnostic {
    warn!("Card {} failed: {}", index, err);
    Diagnostic::new(format!("card[{index}]"), err.to_string())
}

/// Folio and tax year ride along in the card URL's query string.
fn apply_query(card: &mut BuildingCard, url: &Url) {
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "folio" => card.folio = value.into_owned(),
            "taxyear" => card.tax_year = value.into_owned(),
            _ => {}
        }
    }
}
