use crate::parser::classify::{classify_ordinal, RowKind, HEADER_ROWS};
use crate::parser::document::{Document, Row};
use crate::parser::paths::Field;
use crate::record::Sale;

use super::{cell_texts, Context, SPAN};

/// Sales history. The table keeps a fixed number of rows, so trailing rows
/// without a date are padding and get dropped.
pub fn extract(doc: &Document, ctx: &Context<'_>) -> Vec<Sale> {
    doc.rows(ctx.paths.get(Field::SalesRows))
        .iter()
        .enumerate()
        .filter(|(i, _)| matches!(classify_ordinal(*i, HEADER_ROWS), RowKind::Body(_)))
        .map(|(_, row)| build(row))
        .filter(|sale| !sale.date.is_empty())
        .collect()
}

fn build(row: &Row<'_>) -> Sale {
    let [date, sale_type, price, book_page_cin] = cell_texts(row, &SPAN);
    Sale {
        date,
        sale_type,
        price,
        book_page_cin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::tests::{fixture, with_context};

    #[test]
    fn blank_trailing_rows_are_dropped() {
        let doc = fixture("primary");
        let sales = with_context(|ctx| extract(&doc, ctx));
        assert_eq!(
            sales,
            vec![Sale {
                date: "05/01/2019".into(),
                sale_type: "WD".into(),
                price: "$300,000".into(),
                book_page_cin: "12345/6789".into(),
            }]
        );
    }

    #[test]
    fn malformed_price_is_kept_verbatim() {
        let doc = fixture("primary_multi");
        let sales = with_context(|ctx| extract(&doc, ctx));
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[1].price, "n/a");
    }
}
