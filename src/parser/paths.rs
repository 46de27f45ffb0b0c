//! Where every field lives. The source pages carry no ids or classes on the
//! primary page, so fields are addressed by fixed nth-child chains. A layout
//! change should only ever mean editing this table.

use std::collections::HashMap;

use scraper::Selector;

use crate::error::{Result, ScrapeError};

const MAIN: &str = "body > table:nth-child(3) > tbody > tr > td > table > tbody > tr:nth-child(1) > td:nth-child(1)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // primary page: identity block
    SiteAddress,
    Owner,
    MailingAddress,
    ParcelId,
    Mileage,
    UseCode,
    Legal,
    // primary page: section tables (row sets)
    AssessmentRows,
    ExemptionRows,
    SalesRows,
    LandRows,
    SpecialAssessmentRows,
    // card page
    CardParcelId,
    CardUseCode,
    Bedrooms,
    Baths,
    Units,
    Stories,
    Buildings,
    Foundation,
    Exterior,
    RoofType,
    RoofMaterial,
    Interior,
    Floors,
    Plumbing,
    Electric,
    Classification,
    CeilingHeights,
    ConstructionQuality,
    StructureCondition,
    ConstructionClass,
    FeatureRows,
    PermitRows,
    FirstPermitCell,
}

impl Field {
    pub const ALL: [Field; 35] = [
        Field::SiteAddress,
        Field::Owner,
        Field::MailingAddress,
        Field::ParcelId,
        Field::Mileage,
        Field::UseCode,
        Field::Legal,
        Field::AssessmentRows,
        Field::ExemptionRows,
        Field::SalesRows,
        Field::LandRows,
        Field::SpecialAssessmentRows,
        Field::CardParcelId,
        Field::CardUseCode,
        Field::Bedrooms,
        Field::Baths,
        Field::Units,
        Field::Stories,
        Field::Buildings,
        Field::Foundation,
        Field::Exterior,
        Field::RoofType,
        Field::RoofMaterial,
        Field::Interior,
        Field::Floors,
        Field::Plumbing,
        Field::Electric,
        Field::Classification,
        Field::CeilingHeights,
        Field::ConstructionQuality,
        Field::StructureCondition,
        Field::ConstructionClass,
        Field::FeatureRows,
        Field::PermitRows,
        Field::FirstPermitCell,
    ];

    pub fn path(self) -> String {
        let identity = |col: u8, row: u8, tail: &str| {
            format!(
                "{MAIN} > table:nth-child(2) > tbody > tr > td:nth-child({col}) > table > tbody > tr:nth-child({row}) > td:nth-child(2) > {tail}"
            )
        };
        let card = |table: u8, col: u8| {
            format!("#Table{table} > tbody > tr:nth-child(2) > td:nth-child({col}) > p")
        };

        match self {
            Field::SiteAddress => identity(1, 1, "span > a > b"),
            Field::Owner => identity(1, 2, "span"),
            Field::MailingAddress => identity(1, 3, "span"),
            Field::ParcelId => identity(3, 1, "span"),
            Field::Mileage => identity(3, 2, "span"),
            Field::UseCode => identity(3, 3, "span"),
            Field::Legal => format!("{MAIN} > table:nth-child(4) > tbody > tr > td:nth-child(2) > span"),

            Field::AssessmentRows => format!("{MAIN} > table:nth-child(6) > tbody > tr"),
            Field::ExemptionRows => format!("{MAIN} > table:nth-child(8) > tbody > tr"),
            Field::SalesRows => format!(
                "{MAIN} > table:nth-child(10) > tbody > tr > td:nth-child(1) > table:nth-child(1) > tbody > tr"
            ),
            Field::LandRows => format!(
                "{MAIN} > table:nth-child(10) > tbody > tr > td:nth-child(2) > table > tbody > tr"
            ),
            Field::SpecialAssessmentRows => format!("{MAIN} > table:nth-child(12) > tbody > tr"),

            Field::CardParcelId => "#Table6 > tbody > tr:nth-child(2) > td:nth-child(1)".to_string(),
            Field::CardUseCode => "#Table7 > tbody > tr:nth-child(2) > td > p:nth-child(2) > font".to_string(),
            Field::Bedrooms => card(1, 1),
            Field::Baths => card(1, 2),
            Field::Units => card(1, 3),
            Field::Stories => card(1, 4),
            Field::Buildings => card(1, 5),
            Field::Foundation => card(2, 1),
            Field::Exterior => card(2, 2),
            Field::RoofType => card(2, 3),
            Field::RoofMaterial => card(2, 4),
            Field::Interior => card(3, 1),
            Field::Floors => card(3, 2),
            Field::Plumbing => card(3, 3),
            Field::Electric => card(3, 4),
            Field::Classification => card(3, 5),
            Field::CeilingHeights => card(4, 1),
            Field::ConstructionQuality => card(4, 2),
            Field::StructureCondition => card(4, 3),
            Field::ConstructionClass => card(4, 4),
            Field::FeatureRows => "#Table8 > tbody:nth-child(1) > tr".to_string(),
            Field::PermitRows => "#Table5 > tbody > tr".to_string(),
            Field::FirstPermitCell => {
                "#Table5 > tbody:nth-child(1) > tr:nth-child(2) > td:nth-child(1) p".to_string()
            }
        }
    }
}

/// Every field path, compiled once per extraction run.
pub struct Paths {
    selectors: HashMap<Field, Selector>,
}

impl Paths {
    pub fn compile() -> Result<Self> {
        let mut selectors = HashMap::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let path = field.path();
            let selector = Selector::parse(&path).map_err(|e| ScrapeError::Selector {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            selectors.insert(field, selector);
        }
        Ok(Paths { selectors })
    }

    pub fn get(&self, field: Field) -> &Selector {
        // compile() inserts every variant listed in Field::ALL
        &self.selectors[&field]
    }
}
