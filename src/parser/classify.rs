use scraper::Selector;

use crate::record::Diagnostic;

use super::document::Row;

/// Leading rows of most section tables are column titles.
pub const HEADER_ROWS: usize = 2;

/// What an ordinally addressed row holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    /// Zero-based position among the section's body rows.
    Body(usize),
}

pub fn classify_ordinal(index: usize, header_rows: usize) -> RowKind {
    if index < header_rows {
        RowKind::Header
    } else {
        RowKind::Body(index - header_rows)
    }
}

/// The nine exemption attributes, one per body row of the exemption table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExemptionAttribute {
    JustValue,
    Portability,
    AssessedSoh,
    Homestead,
    AddHomestead,
    WidVetDis,
    Senior,
    ExemptType,
    Taxable,
}

impl ExemptionAttribute {
    const ORDER: [ExemptionAttribute; 9] = [
        ExemptionAttribute::JustValue,
        ExemptionAttribute::Portability,
        ExemptionAttribute::AssessedSoh,
        ExemptionAttribute::Homestead,
        ExemptionAttribute::AddHomestead,
        ExemptionAttribute::WidVetDis,
        ExemptionAttribute::Senior,
        ExemptionAttribute::ExemptType,
        ExemptionAttribute::Taxable,
    ];

    pub fn from_body_index(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }
}

/// Role of a row in the land calculation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandRow {
    Header,
    Calculation,
    Building,
    Units,
    Footer,
}

/// Where the trailing rows of a land table sit, derived from its row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LandLayout {
    pub footer: Option<usize>,
    pub units: Option<usize>,
    pub building: Option<usize>,
}

impl LandLayout {
    pub fn classify(&self, index: usize) -> LandRow {
        if Some(index) == self.footer {
            LandRow::Footer
        } else if Some(index) == self.units {
            LandRow::Units
        } else if Some(index) == self.building {
            LandRow::Building
        } else if index < HEADER_ROWS {
            LandRow::Header
        } else {
            LandRow::Calculation
        }
    }
}

/// Decides which trailing land-table row is the optional "Units" row.
///
/// The footer (effective/actual year built) is always the last row. The row
/// above it is either the units row or the building square-footage row; when
/// it is the units row, the building row sits one higher.
#[derive(Debug, Clone, Copy)]
pub struct LandRowRule {
    pub sniff_units: bool,
}

pub const UNITS_MARKER: &str = "Units";

impl Default for LandRowRule {
    fn default() -> Self {
        LandRowRule { sniff_units: true }
    }
}

impl LandRowRule {
    pub fn is_units_row(&self, row: &Row<'_>, span: &Selector) -> bool {
        row.cell(0)
            .map(|c| c.all_text(span).contains(UNITS_MARKER))
            .unwrap_or(false)
    }

    pub fn layout(&self, rows: &[Row<'_>], span: &Selector) -> (LandLayout, Vec<Diagnostic>) {
        let n = rows.len();
        let mut diagnostics = Vec::new();
        if n == 0 {
            return (LandLayout::default(), diagnostics);
        }

        let slot = |back: usize, name: &str, diagnostics: &mut Vec<Diagnostic>| {
            let idx = n.checked_sub(back);
            if idx.is_none() {
                diagnostics.push(Diagnostic::new(
                    "land",
                    format!("table has {n} rows, no room for the {name} row at N-{back}"),
                ));
            }
            idx
        };

        let footer = slot(1, "year built", &mut diagnostics);
        let second_last = n.checked_sub(2);
        let has_units = match second_last {
            Some(i) if self.sniff_units => self.is_units_row(&rows[i], span),
            Some(_) => true,
            None => false,
        };

        let layout = if has_units {
            LandLayout {
                footer,
                units: second_last,
                building: slot(3, "building", &mut diagnostics),
            }
        } else {
            LandLayout {
                footer,
                units: None,
                building: slot(2, "building", &mut diagnostics),
            }
        };
        (layout, diagnostics)
    }
}
