use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ScrapeError;

/// One parcel as presented by the property appraiser's record pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParcelRecord {
    #[serde(rename = "siteaddress")]
    pub site_address: String,
    pub owner: String,
    #[serde(rename = "mailingAddress")]
    pub mailing_address: String,
    pub id: String,
    #[serde(rename = "milage")]
    pub mileage: String,
    #[serde(rename = "use")]
    pub use_code: String,
    pub legal: String,
    #[serde(rename = "PropertyAssessments")]
    pub assessments: Vec<AssessmentYear>,
    #[serde(rename = "ExemptionsTaxable")]
    pub exemptions: ExemptionSummary,
    #[serde(rename = "SalesHistory")]
    pub sales: Vec<Sale>,
    #[serde(rename = "LandCalculations")]
    pub land: LandSummary,
    #[serde(rename = "SpecialAssessments")]
    pub special_assessments: Vec<SpecialAssessmentPeriod>,
}

impl ParcelRecord {
    /// A record only describes a parcel if the search actually landed on one.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.id.is_empty() || self.site_address.is_empty() {
            return Err(ScrapeError::NoParcel {
                id: self.id.clone(),
                site_address: self.site_address.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssessmentYear {
    pub year: String,
    pub land: String,
    #[serde(rename = "buildingimprovement")]
    pub building_improvement: String,
    #[serde(rename = "justmarketvalue")]
    pub just_market_value: String,
    #[serde(rename = "assessedsohvalue")]
    pub assessed_soh_value: String,
    pub tax: String,
    #[serde(rename = "createdat")]
    pub created_at: DateTime<Utc>,
}

/// Exemption and taxable figures, one bucket per taxing authority.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExemptionSummary {
    #[serde(rename = "County")]
    pub county: AuthorityExemption,
    #[serde(rename = "SchoolBoard")]
    pub school_board: AuthorityExemption,
    #[serde(rename = "Municipal")]
    pub municipal: AuthorityExemption,
    #[serde(rename = "Independent")]
    pub independent: AuthorityExemption,
    #[serde(rename = "createdat")]
    pub created_at: DateTime<Utc>,
}

impl ExemptionSummary {
    /// Buckets in source column order.
    pub fn buckets_mut(&mut self) -> [&mut AuthorityExemption; 4] {
        [
            &mut self.county,
            &mut self.school_board,
            &mut self.municipal,
            &mut self.independent,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorityExemption {
    #[serde(rename = "justvalue")]
    pub just_value: String,
    pub portability: String,
    #[serde(rename = "assessedsoh")]
    pub assessed_soh: String,
    pub homestead: String,
    #[serde(rename = "addhomestead")]
    pub add_homestead: String,
    #[serde(rename = "widvetdis")]
    pub wid_vet_dis: String,
    pub senior: String,
    #[serde(rename = "xempttype")]
    pub exempt_type: String,
    pub taxable: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sale {
    pub date: String,
    #[serde(rename = "type")]
    pub sale_type: String,
    pub price: String,
    #[serde(rename = "bookpagecin")]
    pub book_page_cin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LandSummary {
    #[serde(rename = "Calculations")]
    pub calculations: Vec<LandCalculation>,
    #[serde(rename = "adjbldgsf")]
    pub adj_bldg_sf: String,
    pub units: String,
    #[serde(rename = "Cards")]
    pub cards: Vec<BuildingCard>,
    #[serde(rename = "sketchurl")]
    pub sketch_url: String,
    #[serde(rename = "effactyearbuilt")]
    pub eff_act_year_built: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LandCalculation {
    pub price: String,
    pub factor: String,
    #[serde(rename = "type")]
    pub land_type: String,
}

/// A building detail page. Starts life as a URL-only stub found on the
/// primary page and is filled in once its own page has been read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildingCard {
    /// Percent-encoded; decode before fetching.
    #[serde(rename = "cardurl")]
    pub card_url: String,
    #[serde(rename = "taxyear")]
    pub tax_year: String,
    pub folio: String,
    #[serde(rename = "parcelidnumber")]
    pub parcel_id_number: String,
    #[serde(rename = "usecode")]
    pub use_code: String,
    #[serde(rename = "nobedrooms")]
    pub bedrooms: String,
    #[serde(rename = "nobaths")]
    pub baths: String,
    #[serde(rename = "nounits")]
    pub units: String,
    #[serde(rename = "nostories")]
    pub stories: String,
    #[serde(rename = "nobuildings")]
    pub buildings: String,
    pub foundation: String,
    pub exterior: String,
    #[serde(rename = "rooftype")]
    pub roof_type: String,
    #[serde(rename = "roofmaterial")]
    pub roof_material: String,
    pub interior: String,
    pub floors: String,
    pub plumbing: String,
    pub electric: String,
    pub classification: String,
    #[serde(rename = "ceilingheights")]
    pub ceiling_heights: String,
    #[serde(rename = "qualityofconstruction")]
    pub construction_quality: String,
    #[serde(rename = "currentconditionstructure")]
    pub structure_condition: String,
    #[serde(rename = "constructionclass")]
    pub construction_class: String,
    #[serde(rename = "Permits")]
    pub permits: Vec<Permit>,
    #[serde(rename = "ExtraFeatures")]
    pub extra_features: Vec<ExtraFeature>,
}

impl BuildingCard {
    pub fn stub(card_url: String) -> Self {
        BuildingCard {
            card_url,
            ..Default::default()
        }
    }

    /// Fill a stub with the detail read from its card page. The stub keeps
    /// its own URL, folio and tax year.
    pub fn attach(&mut self, detail: BuildingCard) {
        let card_url = std::mem::take(&mut self.card_url);
        let tax_year = std::mem::take(&mut self.tax_year);
        let folio = std::mem::take(&mut self.folio);
        *self = BuildingCard {
            card_url,
            tax_year,
            folio,
            ..detail
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Permit {
    #[serde(rename = "permitco")]
    pub number: String,
    #[serde(rename = "permittype")]
    pub permit_type: String,
    #[serde(rename = "estcost")]
    pub est_cost: String,
    #[serde(rename = "permitdate")]
    pub permit_date: String,
    #[serde(rename = "codate")]
    pub co_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtraFeature {
    pub feature: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpecialAssessmentPeriod {
    pub fire: String,
    #[serde(rename = "garb")]
    pub garbage: String,
    pub light: String,
    #[serde(rename = "drain")]
    pub drainage: String,
    #[serde(rename = "impr")]
    pub improvement: String,
    #[serde(rename = "safe")]
    pub safety: String,
    pub storm: String,
    pub clean: String,
    pub misc: String,
}

/// Something the pipeline could not do that did not stop it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub scope: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            scope: scope.into(),
            message: message.into(),
        }
    }
}

/// Result of one full extraction: the record plus anything worth reporting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    pub record: ParcelRecord,
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_serializes_every_field() {
        let json = serde_json::to_value(ParcelRecord::default()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "siteaddress",
            "owner",
            "mailingAddress",
            "id",
            "milage",
            "use",
            "legal",
        ] {
            assert_eq!(obj[key], "", "{key}");
        }
        let county = &json["ExemptionsTaxable"]["County"];
        assert_eq!(county["widvetdis"], "");
        assert_eq!(county["justvalue"], "");
        assert_eq!(json["LandCalculations"]["units"], "");
        assert!(json["SalesHistory"].as_array().unwrap().is_empty());
    }

    #[test]
    fn validate_requires_id_and_address() {
        let mut record = ParcelRecord::default();
        assert!(record.validate().is_err());
        record.id = "504210010010".into();
        assert!(record.validate().is_err());
        record.site_address = "123 MAIN ST".into();
        assert!(record.validate().is_ok());
    }

    #[test]
    fn card_stub_carries_only_url() {
        let card = BuildingCard::stub("RecBuildingCard.asp%3Ffolio%3D1".into());
        assert_eq!(card.card_url, "RecBuildingCard.asp%3Ffolio%3D1");
        assert!(card.folio.is_empty());
        assert!(card.permits.is_empty());
    }
}
