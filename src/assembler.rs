use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use url::Url;

use crate::config::Settings;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::parser::classify::LandRowRule;
use crate::parser::extract::{self, identity, land};
use crate::parser::{Context, Document, Paths};
use crate::record::{Diagnostic, Extraction, ParcelRecord};
use crate::resolver::CardResolver;

/// Progress of one extraction. Every step moves forward; there is no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetched,
    IdentityExtracted,
    SectionsExtracted,
    CardsResolved,
    Done,
}

struct Assembly {
    stage: Stage,
    record: ParcelRecord,
    diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    fn advance(&mut self, next: Stage) {
        info!(from = ?self.stage, to = ?next, "extraction stage");
        self.stage = next;
    }
}

/// Turns a primary page (and the card pages it links to) into one record.
pub struct Assembler<F: Fetcher + 'static> {
    fetcher: Arc<F>,
    resolver: CardResolver<F>,
    land_rule: LandRowRule,
    clock: fn() -> DateTime<Utc>,
}

impl<F: Fetcher + 'static> Assembler<F> {
    pub fn new(fetcher: Arc<F>, settings: &Settings) -> Result<Self> {
        let resolver = CardResolver::new(
            Arc::clone(&fetcher),
            &settings.base_url,
            settings.card_concurrency,
            settings.fetch_timeout(),
        )?;
        Ok(Assembler {
            fetcher,
            resolver,
            land_rule: LandRowRule {
                sniff_units: settings.sniff_units_row,
            },
            clock: Utc::now,
        })
    }

    /// Stamp records with a fixed clock instead of the wall clock.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch the primary page, then assemble. An unfetchable primary page is fatal.
    pub async fn assemble_url(&self, url: &str) -> Result<Extraction> {
        let primary = self.fetcher.fetch(url).await?;
        self.assemble(&primary).await
    }

    pub async fn assemble(&self, primary: &str) -> Result<Extraction> {
        let paths = Paths::compile()?;
        let ctx = Context {
            paths: &paths,
            created_at: (self.clock)(),
            land_rule: self.land_rule,
        };
        let mut assembly = Assembly {
            stage: Stage::Fetched,
            record: ParcelRecord::default(),
            diagnostics: Vec::new(),
        };

        {
            let doc = Document::parse(primary);

            assembly.record = identity::extract(&doc, &ctx);
            assembly.advance(Stage::IdentityExtracted);

            let record = std::mem::take(&mut assembly.record);
            assembly.record = extract::extract_sections(&doc, &ctx, record, &mut assembly.diagnostics);
            for d in &assembly.diagnostics {
                warn!(scope = %d.scope, "{}", d.message);
            }
            assembly.advance(Stage::SectionsExtracted);
        }

        let card_diagnostics = self
            .resolver
            .resolve(&mut assembly.record.land.cards, &ctx)
            .await;
        assembly.diagnostics.extend(card_diagnostics);
        assembly.advance(Stage::CardsResolved);
        assembly.advance(Stage::Done);

        Ok(Extraction {
            record: assembly.record,
            diagnostics: assembly.diagnostics,
        })
    }

    /// Where the card pages linked from `primary` live, in discovery order.
    /// A link that does not resolve keeps its slot as `None`.
    pub fn card_targets(&self, primary: &str) -> Result<Vec<Option<Url>>> {
        let paths = Paths::compile()?;
        let ctx = Context {
            paths: &paths,
            created_at: (self.clock)(),
            land_rule: self.land_rule,
        };
        let doc = Document::parse(primary);
        let (land, _) = land::extract(&doc, &ctx);
        let targets = land
            .cards
            .iter()
            .enumerate()
            .map(|(i, card)| match self.resolver.target(card) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Card {} has no usable URL: {}", i, e);
                    None
                }
            })
            .collect();
        Ok(targets)
    }
}
