use crate::parser::classify::{classify_ordinal, ExemptionAttribute, RowKind, HEADER_ROWS};
use crate::parser::document::{Document, Row};
use crate::parser::paths::Field;
use crate::record::{AuthorityExemption, ExemptionSummary};

use super::{cell_texts, Context, SPAN};

/// The exemption table is transposed: each row is one attribute, each of the
/// four value columns one taxing authority.
pub fn extract(doc: &Document, ctx: &Context<'_>) -> ExemptionSummary {
    let mut summary = ExemptionSummary {
        created_at: ctx.created_at,
        ..Default::default()
    };

    for (i, row) in doc.rows(ctx.paths.get(Field::ExemptionRows)).iter().enumerate() {
        let RowKind::Body(body) = classify_ordinal(i, HEADER_ROWS) else {
            continue;
        };
        if let Some(attribute) = ExemptionAttribute::from_body_index(body) {
            summary = fan_out(summary, row, attribute);
        }
    }
    summary
}

fn fan_out(
    mut summary: ExemptionSummary,
    row: &Row<'_>,
    attribute: ExemptionAttribute,
) -> ExemptionSummary {
    // column 0 is the attribute label
    let [_, county, school, municipal, independent] = cell_texts(row, &SPAN);
    for (bucket, value) in summary
        .buckets_mut()
        .into_iter()
        .zip([county, school, municipal, independent])
    {
        *slot(bucket, attribute) = value;
    }
    summary
}

fn slot(bucket: &mut AuthorityExemption, attribute: ExemptionAttribute) -> &mut String {
    match attribute {
        ExemptionAttribute::JustValue => &mut bucket.just_value,
        ExemptionAttribute::Portability => &mut bucket.portability,
        ExemptionAttribute::AssessedSoh => &mut bucket.assessed_soh,
        ExemptionAttribute::Homestead => &mut bucket.homestead,
        ExemptionAttribute::AddHomestead => &mut bucket.add_homestead,
        ExemptionAttribute::WidVetDis => &mut bucket.wid_vet_dis,
        ExemptionAttribute::Senior => &mut bucket.senior,
        ExemptionAttribute::ExemptType => &mut bucket.exempt_type,
        ExemptionAttribute::Taxable => &mut bucket.taxable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::tests::{fixture, with_context};

    #[test]
    fn columns_fan_out_to_authorities() {
        let doc = fixture("primary");
        let e = with_context(|ctx| extract(&doc, ctx));
        assert_eq!(e.county.just_value, "$170,000");
        assert_eq!(e.school_board.just_value, "$170,001");
        assert_eq!(e.municipal.just_value, "$170,002");
        assert_eq!(e.independent.just_value, "$170,003");
        assert_eq!(e.county.homestead, "$25,000");
        assert_eq!(e.school_board.homestead, "$25,001");
        assert_eq!(e.county.wid_vet_dis, "$500");
        assert_eq!(e.county.exempt_type, "HX");
        assert_eq!(e.independent.taxable, "$119,500");
    }

    #[test]
    fn missing_table_leaves_four_empty_buckets() {
        let doc = Document::parse("<html><body></body></html>");
        let e = with_context(|ctx| extract(&doc, ctx));
        assert_eq!(e.county, AuthorityExemption::default());
        assert_eq!(e.independent, AuthorityExemption::default());
    }
}
