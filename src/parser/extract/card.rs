use tracing::debug;

use crate::parser::classify::{classify_ordinal, RowKind, HEADER_ROWS};
use crate::parser::document::{normalize, Document, Row};
use crate::parser::paths::Field;
use crate::record::{BuildingCard, ExtraFeature, Permit};

use super::{Context, P};

/// The permits table always prints a first row; it only holds a permit when
/// its number cell has more than this many characters.
const PERMIT_MIN_LEN: usize = 2;

/// Building detail read from a card page. URL, folio and tax year come from
/// the stub this detail is attached to, not from the page.
pub fn extract(doc: &Document, ctx: &Context<'_>) -> BuildingCard {
    let text = |field: Field| doc.text(ctx.paths.get(field));

    let mut card = BuildingCard {
        parcel_id_number: text(Field::CardParcelId),
        use_code: text(Field::CardUseCode),
        bedrooms: text(Field::Bedrooms),
        baths: text(Field::Baths),
        units: text(Field::Units),
        stories: text(Field::Stories),
        buildings: text(Field::Buildings),
        foundation: text(Field::Foundation),
        exterior: text(Field::Exterior),
        roof_type: text(Field::RoofType),
        roof_material: text(Field::RoofMaterial),
        interior: text(Field::Interior),
        floors: text(Field::Floors),
        plumbing: text(Field::Plumbing),
        electric: text(Field::Electric),
        classification: text(Field::Classification),
        ceiling_heights: text(Field::CeilingHeights),
        construction_quality: text(Field::ConstructionQuality),
        structure_condition: text(Field::StructureCondition),
        construction_class: text(Field::ConstructionClass),
        ..Default::default()
    };

    let feature_rows = doc.rows(ctx.paths.get(Field::FeatureRows));
    if feature_rows.is_empty() {
        debug!("card has no extra features table");
    } else {
        card.extra_features = extra_features(&feature_rows);
    }

    let first_permit = text(Field::FirstPermitCell);
    if first_permit.chars().count() > PERMIT_MIN_LEN {
        card.permits = permits(&doc.rows(ctx.paths.get(Field::PermitRows)));
    } else {
        debug!("card has no permits");
    }

    card
}

fn body_rows<'r, 'a>(rows: &'r [Row<'a>]) -> impl Iterator<Item = &'r Row<'a>> {
    rows.iter()
        .enumerate()
        .filter(|(i, _)| matches!(classify_ordinal(*i, HEADER_ROWS), RowKind::Body(_)))
        .map(|(_, row)| row)
}

fn extra_features(rows: &[Row<'_>]) -> Vec<ExtraFeature> {
    body_rows(rows)
        .map(|row| {
            let raw: Vec<String> = row.cells().iter().map(|c| c.all_text(&P)).collect();
            ExtraFeature {
                feature: normalize(&raw.join(" ")),
            }
        })
        .collect()
}

fn permits(rows: &[Row<'_>]) -> Vec<Permit> {
    body_rows(rows)
        .map(|row| {
            let cells = row.cells();
            let text = |i: usize| cells.get(i).map(|c| c.all_text(&P)).unwrap_or_default();
            Permit {
                number: text(0),
                permit_type: text(1),
                est_cost: text(2),
                permit_date: text(3),
                co_date: text(4),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::tests::{fixture, with_context};

    #[test]
    fn reads_building_detail() {
        let doc = fixture("card");
        let card = with_context(|ctx| extract(&doc, ctx));
        assert_eq!(card.parcel_id_number, "5042 10 01 0010");
        assert_eq!(card.use_code, "01-01");
        assert_eq!(card.bedrooms, "3");
        assert_eq!(card.baths, "2");
        assert_eq!(card.stories, "1");
        assert_eq!(card.foundation, "CONC SLAB");
        assert_eq!(card.roof_material, "BARREL TILE");
        assert_eq!(card.classification, "RESIDENTIAL");
        assert_eq!(card.construction_class, "C");
        assert!(card.card_url.is_empty());
        assert!(card.folio.is_empty());
    }

    #[test]
    fn optional_sections_present() {
        let doc = fixture("card");
        let card = with_context(|ctx| extract(&doc, ctx));
        assert_eq!(card.extra_features.len(), 2);
        assert_eq!(card.extra_features[0].feature, "POOL - COMMERCIAL");
        assert_eq!(card.permits.len(), 1);
        assert_eq!(card.permits[0].number, "19-1234");
        assert_eq!(card.permits[0].permit_type, "ROOF");
        assert_eq!(card.permits[0].co_date, "06/30/2019");
    }

    #[test]
    fn optional_sections_absent() {
        let doc = fixture("card_bare");
        let card = with_context(|ctx| extract(&doc, ctx));
        assert_eq!(card.bedrooms, "4");
        assert!(card.extra_features.is_empty());
        assert!(card.permits.is_empty());
    }
}
