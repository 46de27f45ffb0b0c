use std::sync::LazyLock;

use scraper::Selector;
use tracing::debug;

use crate::parser::classify::LandRow;
use crate::parser::document::{Document, Row};
use crate::parser::paths::Field;
use crate::record::{BuildingCard, Diagnostic, LandCalculation, LandSummary};

use super::{cell_texts, Context, A, SPAN};

static CARD_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a:nth-child(2)").unwrap());
static SKETCH_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a:nth-child(3)").unwrap());

/// Units value when the parcel is not a condominium.
pub const NO_UNITS: &str = "0";

/// Land calculations, building totals, year built and the building card stubs.
pub fn extract(doc: &Document, ctx: &Context<'_>) -> (LandSummary, Vec<Diagnostic>) {
    let rows = doc.rows(ctx.paths.get(Field::LandRows));
    let (layout, diagnostics) = ctx.land_rule.layout(&rows, &SPAN);
    let mut land = LandSummary::default();

    for (i, row) in rows.iter().enumerate() {
        match layout.classify(i) {
            LandRow::Header => {}
            LandRow::Footer => {
                land.eff_act_year_built = row
                    .cell(0)
                    .map(|c| c.nested_text(&A, &SPAN))
                    .unwrap_or_default();
            }
            LandRow::Units => {
                land.units = second_cell(row);
            }
            LandRow::Building => read_building_row(row, &mut land),
            LandRow::Calculation => {
                let [price, factor, land_type] = cell_texts(row, &SPAN);
                if !price.is_empty() {
                    land.calculations.push(LandCalculation {
                        price,
                        factor,
                        land_type,
                    });
                }
            }
        }
    }

    if !rows.is_empty() && layout.units.is_none() {
        land.units = NO_UNITS.to_string();
    }
    (land, diagnostics)
}

fn second_cell(row: &Row<'_>) -> String {
    row.cell(1).map(|c| c.all_text(&SPAN)).unwrap_or_default()
}

fn read_building_row(row: &Row<'_>, land: &mut LandSummary) {
    land.adj_bldg_sf = second_cell(row);

    let Some(first) = row.cell(0) else {
        return;
    };
    match first.attrs(&SKETCH_LINK, "href").into_iter().next() {
        Some(href) => land.sketch_url = href,
        None => debug!("no sketch URL"),
    }

    let card_urls = first.attrs(&CARD_LINK, "href");
    if card_urls.is_empty() {
        debug!("no card URL");
    }
    for href in card_urls {
        let escaped = urlencoding::encode(&href).into_owned();
        if !land.cards.iter().any(|c| c.card_url == escaped) {
            land.cards.push(BuildingCard::stub(escaped));
        }
    }
}
