use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").unwrap());
static EDGE_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\p{Zs}]+|[\s\p{Zs}]+$").unwrap());
static INNER_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\p{Zs}]{2,}").unwrap());

/// Text rule applied to every value pulled out of a page: line breaks become
/// spaces, edges are trimmed, and inner whitespace runs collapse to one space.
pub fn normalize(raw: &str) -> String {
    let flat = LINE_BREAK_RE.replace_all(raw, " ");
    let trimmed = EDGE_WS_RE.replace_all(&flat, "");
    INNER_WS_RE.replace_all(&trimmed, " ").into_owned()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// A fetched page, parsed once and queried by structural path.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Document {
            html: Html::parse_document(body),
        }
    }

    /// Normalized text of every node the path matches. Empty when nothing matches.
    pub fn text(&self, path: &Selector) -> String {
        let raw: String = self.html.select(path).map(element_text).collect();
        normalize(&raw)
    }

    pub fn element(&self, path: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(path).next()
    }

    pub fn rows(&self, path: &Selector) -> Vec<Row<'_>> {
        self.html.select(path).map(Row).collect()
    }
}

/// One `tr` of a section table.
#[derive(Clone, Copy)]
pub struct Row<'a>(ElementRef<'a>);

impl<'a> Row<'a> {
    /// Direct `td` children, in column order.
    pub fn cells(&self) -> Vec<Cell<'a>> {
        self.0
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .map(Cell)
            .collect()
    }

    pub fn cell(&self, index: usize) -> Option<Cell<'a>> {
        self.cells().into_iter().nth(index)
    }

    /// Text of the first `inner` element in the given cell, or "".
    pub fn cell_text(&self, index: usize, inner: &Selector) -> String {
        self.cell(index)
            .map(|c| c.first_text(inner))
            .unwrap_or_default()
    }
}

/// One `td`.
#[derive(Clone, Copy)]
pub struct Cell<'a>(ElementRef<'a>);

impl<'a> Cell<'a> {
    pub fn first_text(&self, inner: &Selector) -> String {
        self.0
            .select(inner)
            .next()
            .map(|el| normalize(&element_text(el)))
            .unwrap_or_default()
    }

    /// Text of the first `inner` inside the first `outer`.
    pub fn nested_text(&self, outer: &Selector, inner: &Selector) -> String {
        self.0
            .select(outer)
            .next()
            .and_then(|o| o.select(inner).next())
            .map(|el| normalize(&element_text(el)))
            .unwrap_or_default()
    }

    /// Text of every `inner` element, concatenated before normalizing.
    pub fn all_text(&self, inner: &Selector) -> String {
        let raw: String = self.0.select(inner).map(element_text).collect();
        normalize(&raw)
    }

    pub fn attrs(&self, inner: &Selector, name: &str) -> Vec<String> {
        self.0
            .select(inner)
            .filter_map(|el| el.value().attr(name))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize("  123  MAIN\r\nST \n"), "123 MAIN ST");
        assert_eq!(normalize("a\u{a0}\u{a0}b"), "a b");
        assert_eq!(normalize("\t\n"), "");
        assert_eq!(normalize("single space"), "single space");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            " ",
            "\r\n\r\n",
            "  lead and trail  ",
            "a\r\rb",
            "x\u{2003} \u{a0}y",
            "tab\tsingle",
            "\u{a0}nbsp\u{a0}",
            "CITY  OF\n\nFORT LAUDERDALE",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "{s:?}");
        }
    }

    #[test]
    fn missing_path_yields_empty_text() {
        let doc = Document::parse("<html><body><p>hi</p></body></html>");
        let sel = Selector::parse("body > table:nth-child(3) span").unwrap();
        assert_eq!(doc.text(&sel), "");
        assert!(doc.element(&sel).is_none());
        assert!(doc.rows(&sel).is_empty());
    }

    #[test]
    fn row_cells_are_direct_children() {
        let doc = Document::parse(
            "<table><tr><td><span> 2023 </span></td><td><span>$50,000</span><span>x</span></td></tr></table>",
        );
        let rows = doc.rows(&Selector::parse("tr").unwrap());
        let span = Selector::parse("span").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells().len(), 2);
        assert_eq!(rows[0].cell_text(0, &span), "2023");
        assert_eq!(rows[0].cell_text(1, &span), "$50,000");
        assert_eq!(rows[0].cell_text(5, &span), "");
    }
}
