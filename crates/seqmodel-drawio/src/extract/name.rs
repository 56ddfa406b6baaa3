//! System base name resolution.

use log::debug;

use crate::{
    document::Document,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
};

const DEFAULT_SYSTEM_NAME: &str = "System";

/// Default page names draw.io assigns (`Page-1`, localized variants).
const DEFAULT_PAGE_PREFIXES: [&str; 2] = ["Page-", "หน้า-"];

/// Caller-supplied inputs to base name resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameHints<'a> {
    /// Name given explicitly by the caller; wins over everything else.
    pub explicit: Option<&'a str>,
    /// Stem of the input file, used when the document names nothing.
    pub file_stem: Option<&'a str>,
}

/// Convert arbitrary text to PascalCase.
///
/// Splits on runs of characters that are not ASCII alphanumeric and
/// upper-cases the first letter of each part, leaving the rest as written.
/// Returns an empty string when nothing alphanumeric remains.
///
/// # Examples
///
/// ```
/// # use seqmodel_drawio::extract::to_pascal_case;
/// assert_eq!(to_pascal_case("online shop-checkout"), "OnlineShopCheckout");
/// assert_eq!(to_pascal_case("ATM v2"), "ATMV2");
/// assert_eq!(to_pascal_case("--"), "");
/// ```
pub fn to_pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn is_default_page_name(name: &str) -> bool {
    DEFAULT_PAGE_PREFIXES.iter().any(|prefix| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
    })
}

/// Resolve the PascalCase base name of the system.
///
/// Candidates in order: the explicit hint, the first non-default page
/// name, the document root's name, the file stem. The first candidate
/// that yields a non-empty identifier wins; otherwise the result is
/// `System` and [`ErrorCode::W101`] is reported.
pub(crate) fn resolve(
    document: &Document,
    hints: NameHints<'_>,
    collector: &mut DiagnosticCollector,
) -> String {
    let page = document
        .page_names()
        .iter()
        .map(String::as_str)
        .find(|name| !is_default_page_name(name));
    let root = document.root_name().filter(|name| !is_default_page_name(name));

    let resolved = [hints.explicit, page, root, hints.file_stem]
        .into_iter()
        .flatten()
        .map(to_pascal_case)
        .find(|name| !name.is_empty());

    match resolved {
        Some(name) => {
            debug!(name = name.as_str(); "Resolved base name");
            name
        }
        None => {
            collector.emit(
                Diagnostic::warning(format!(
                    "diagram has no usable name, using `{DEFAULT_SYSTEM_NAME}`"
                ))
                .with_code(ErrorCode::W101)
                .with_help("rename the diagram page or pass an explicit name"),
            );
            DEFAULT_SYSTEM_NAME.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pages: &[&str], root: Option<&str>) -> Document {
        Document::new(
            Vec::new(),
            pages.iter().map(|p| p.to_string()).collect(),
            root.map(str::to_string),
            "",
        )
    }

    fn run(document: &Document, hints: NameHints<'_>) -> (String, usize) {
        let mut collector = DiagnosticCollector::new();
        let name = resolve(document, hints, &mut collector);
        (name, collector.into_diagnostics().len())
    }

    #[test]
    fn test_page_name_preferred() {
        let document = doc(&["Page-1", "order flow"], Some("ignored"));
        assert_eq!(run(&document, NameHints::default()), ("OrderFlow".into(), 0));
    }

    #[test]
    fn test_default_pages_are_skipped() {
        let document = doc(&["Page-1", "หน้า-1"], Some("bank app"));
        assert_eq!(run(&document, NameHints::default()).0, "BankApp");
    }

    #[test]
    fn test_file_stem_fallback() {
        let document = doc(&["Page-2"], None);
        let hints = NameHints {
            explicit: None,
            file_stem: Some("atm_withdraw"),
        };
        assert_eq!(run(&document, hints).0, "AtmWithdraw");
    }

    #[test]
    fn test_explicit_wins() {
        let document = doc(&["Checkout"], None);
        let hints = NameHints {
            explicit: Some("my system"),
            file_stem: Some("file"),
        };
        assert_eq!(run(&document, hints).0, "MySystem");
    }

    #[test]
    fn test_missing_name_warns() {
        let document = doc(&[], None);
        let hints = NameHints {
            explicit: None,
            file_stem: Some("___"),
        };
        assert_eq!(run(&document, hints), ("System".into(), 1));
    }

    #[test]
    fn test_default_page_name_detection() {
        assert!(is_default_page_name("Page-1"));
        assert!(is_default_page_name("Page-12"));
        assert!(!is_default_page_name("Page-"));
        assert!(!is_default_page_name("Page-One"));
    }
}
