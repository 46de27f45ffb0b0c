use chrono::{DateTime, Utc};

use crate::parser::classify::{classify_ordinal, RowKind, HEADER_ROWS};
use crate::parser::document::{Document, Row};
use crate::parser::paths::Field;
use crate::record::AssessmentYear;

use super::{cell_texts, Context, SPAN};

/// Property assessment values, one entry per tax year row, in page order.
pub fn extract(doc: &Document, ctx: &Context<'_>) -> Vec<AssessmentYear> {
    doc.rows(ctx.paths.get(Field::AssessmentRows))
        .iter()
        .enumerate()
        .filter_map(|(i, row)| match classify_ordinal(i, HEADER_ROWS) {
            RowKind::Header => None,
            RowKind::Body(_) => Some(build(row, ctx.created_at)),
        })
        .collect()
}

fn build(row: &Row<'_>, created_at: DateTime<Utc>) -> AssessmentYear {
    let [year, land, building_improvement, just_market_value, assessed_soh_value, tax] =
        cell_texts(row, &SPAN);
    AssessmentYear {
        year,
        land,
        building_improvement,
        just_market_value,
        assessed_soh_value,
        tax,
        created_at,
    }
}
