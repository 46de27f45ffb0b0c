use crate::parser::classify::{classify_ordinal, RowKind, HEADER_ROWS};
use crate::parser::document::{Document, Row};
use crate::parser::paths::Field;
use crate::record::SpecialAssessmentPeriod;

use super::{cell_texts, Context, SPAN};

pub fn extract(doc: &Document, ctx: &Context<'_>) -> Vec<SpecialAssessmentPeriod> {
    doc.rows(ctx.paths.get(Field::SpecialAssessmentRows))
        .iter()
        .enumerate()
        .filter(|(i, _)| matches!(classify_ordinal(*i, HEADER_ROWS), RowKind::Body(_)))
        .filter_map(|(_, row)| build(row))
        .collect()
}

/// `None` for a row with no printed amount in any column. A row with an empty
/// fire cell but amounts elsewhere is kept.
fn build(row: &Row<'_>) -> Option<SpecialAssessmentPeriod> {
    let cells: [String; 9] = cell_texts(row, &SPAN);
    if cells.iter().all(String::is_empty) {
        return None;
    }
    let [fire, garbage, light, drainage, improvement, safety, storm, clean, misc] = cells;
    Some(SpecialAssessmentPeriod {
        fire,
        garbage,
        light,
        drainage,
        improvement,
        safety,
        storm,
        clean,
        misc,
    })
}

#[cfg(test)]
mod tests {
    use scraper::Selector;

    use super::*;
    use crate::parser::extract::tests::{fixture, with_context};

    fn single_row(cells: &[&str]) -> Document {
        let tds: String = cells.iter().map(|c| format!("<td><span>{c}</span></td>")).collect();
        Document::parse(&format!("<table><tr>{tds}</tr></table>"))
    }

    #[test]
    fn reads_billing_rows_and_skips_blank_ones() {
        let doc = fixture("primary");
        let periods = with_context(|ctx| extract(&doc, ctx));
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].fire, "$256.36");
        assert_eq!(periods[0].garbage, "");
        assert_eq!(periods[0].storm, "$35.00");
        assert_eq!(periods[0].misc, "");
    }

    #[test]
    fn row_without_fire_amount_is_kept() {
        let doc = single_row(&["", "$310.00", "", "", "", "", "$35.00", "", ""]);
        let rows = doc.rows(&Selector::parse("tr").unwrap());
        let period = build(&rows[0]).unwrap();
        assert_eq!(period.fire, "");
        assert_eq!(period.garbage, "$310.00");
        assert_eq!(period.storm, "$35.00");
    }

    #[test]
    fn row_without_any_amount_is_dropped() {
        let doc = single_row(&["\u{a0}"; 9]);
        let rows = doc.rows(&Selector::parse("tr").unwrap());
        assert!(build(&rows[0]).is_none());
    }
}
