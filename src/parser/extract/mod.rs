pub mod assessments;
pub mod card;
pub mod exemptions;
pub mod identity;
pub mod land;
pub mod sales;
pub mod special;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use scraper::Selector;

use super::classify::LandRowRule;
use super::document::{Document, Row};
use super::paths::Paths;
use crate::record::{Diagnostic, ParcelRecord};

pub(crate) static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
pub(crate) static P: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
pub(crate) static A: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Everything an extraction pass needs besides the page itself.
pub struct Context<'a> {
    pub paths: &'a Paths,
    pub created_at: DateTime<Utc>,
    pub land_rule: LandRowRule,
}

/// Texts of the first N cells of a row; missing cells read as "".
pub(crate) fn cell_texts<const N: usize>(row: &Row<'_>, inner: &Selector) -> [String; N] {
    std::array::from_fn(|i| row.cell_text(i, inner))
}

/// Run every primary-page section against `doc`, writing into `record`.
///
/// Sections read disjoint parts of the page and write disjoint fields, so
/// their order here carries no meaning.
pub fn extract_sections(
    doc: &Document,
    ctx: &Context<'_>,
    mut record: ParcelRecord,
    diagnostics: &mut Vec<Diagnostic>,
) -> ParcelRecord {
    record.assessments = assessments::extract(doc, ctx);
    record.exemptions = exemptions::extract(doc, ctx);
    record.sales = sales::extract(doc, ctx);
    let (land, land_diagnostics) = land::extract(doc, ctx);
    record.land = land;
    diagnostics.extend(land_diagnostics);
    record.special_assessments = special::extract(doc, ctx);
    record
}

// ── Tests ──

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;

    pub(crate) fn fixture(name: &str) -> Document {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap();
        Document::parse(&html)
    }

    pub(crate) fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    pub(crate) fn with_context<T>(f: impl FnOnce(&Context<'_>) -> T) -> T {
        let paths = Paths::compile().unwrap();
        let ctx = Context {
            paths: &paths,
            created_at: fixed_time(),
            land_rule: LandRowRule::default(),
        };
        f(&ctx)
    }

    /// Identity plus every section of a primary page. Cards stay as stubs.
    fn extract_primary(doc: &Document, ctx: &Context<'_>) -> (ParcelRecord, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let record = identity::extract(doc, ctx);
        let record = extract_sections(doc, ctx, record, &mut diagnostics);
        (record, diagnostics)
    }

    fn run(name: &str) -> ParcelRecord {
        let doc = fixture(name);
        with_context(|ctx| extract_primary(&doc, ctx).0)
    }

    #[test]
    fn primary_page_scenario() {
        let r = run("primary");
        assert_eq!(r.site_address, "1234 SE 5 STREET FORT LAUDERDALE FL 33301");
        assert_eq!(r.id, "504210010010");
        assert_eq!(r.assessments.len(), 1);
        assert_eq!(r.assessments[0].year, "2023");
        assert_eq!(r.assessments[0].land, "$50,000");
        assert_eq!(r.assessments[0].building_improvement, "$120,000");
        assert_eq!(r.sales.len(), 1);
        assert_eq!(r.sales[0].price, "$300,000");
        assert_eq!(r.sales[0].book_page_cin, "12345/6789");
        assert_eq!(r.exemptions.county.just_value, "$170,000");
        assert_eq!(r.exemptions.county.homestead, "$25,000");
        assert_eq!(r.land.units, "1");
        assert_eq!(r.land.eff_act_year_built, "1998");
        assert_eq!(r.land.cards.len(), 1);
        assert!(r.land.cards[0].card_url.contains("folio%3D504210010010"));
        assert_eq!(r.special_assessments.len(), 1);
    }

    #[test]
    fn empty_document_yields_total_empty_record() {
        let doc = Document::parse("<html><body></body></html>");
        let (r, diagnostics) = with_context(|ctx| extract_primary(&doc, ctx));
        assert!(diagnostics.is_empty());
        assert_eq!(
            r,
            ParcelRecord {
                exemptions: crate::record::ExemptionSummary {
                    created_at: fixed_time(),
                    ..Default::default()
                },
                ..Default::default()
            }
        );
        assert!(r.validate().is_err());
    }

    /// Runs `name` and checks that it equals the full fixture once `restore`
    /// copies back the one section that was removed from it.
    fn assert_only_section_differs(name: &str, restore: fn(&mut ParcelRecord, &ParcelRecord)) {
        let full = run("primary");
        let mut patched = run(name);
        restore(&mut patched, &full);
        assert_eq!(patched, full, "{name}");
        assert_eq!(
            serde_json::to_string(&patched).unwrap(),
            serde_json::to_string(&full).unwrap()
        );
    }

    #[test]
    fn removing_sales_leaves_the_rest_identical() {
        assert!(run("primary_no_sales").sales.is_empty());
        assert_only_section_differs("primary_no_sales", |r, full| r.sales = full.sales.clone());
    }

    #[test]
    fn removing_exemptions_leaves_the_rest_identical() {
        let e = run("primary_no_exemptions").exemptions;
        assert_eq!(e.county, crate::record::AuthorityExemption::default());
        assert_eq!(e.independent, crate::record::AuthorityExemption::default());
        assert_only_section_differs("primary_no_exemptions", |r, full| {
            r.exemptions = full.exemptions.clone()
        });
    }

    #[test]
    fn removing_land_leaves_the_rest_identical() {
        let land = run("primary_no_land").land;
        assert!(land.cards.is_empty());
        assert!(land.calculations.is_empty());
        assert_eq!(land, crate::record::LandSummary::default());
        assert_only_section_differs("primary_no_land", |r, full| r.land = full.land.clone());
    }
}
