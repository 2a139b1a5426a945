use crate::sbom_generation::domain::BomLicense;

/// Placeholder values package managers write when no license is declared
const PLACEHOLDERS: [&str; 3] = ["UNKNOWN", "NONE", "NOASSERTION"];

/// LicensePriority policy for turning declared license values into [`BomLicense`]s
///
/// Declared values are classified as follows:
/// 1. `http(s)://…` is a license URL
/// 2. anything containing an SPDX operator (`AND`, `OR`, `WITH`) or wrapped in
///    parentheses is an expression
/// 3. `SEE LICENSE IN …` style free text is kept as a name
/// 4. everything else is treated as an SPDX identifier
pub struct LicensePriority;

impl LicensePriority {
    /// Picks the first candidate carrying an identifier.
    ///
    /// # Arguments
    /// * `primary` - License recorded in the lockfile or manifest entry
    /// * `fallback` - License read from the installed package, if any
    pub fn select_license(
        primary: Option<BomLicense>,
        fallback: Option<BomLicense>,
    ) -> Option<BomLicense> {
        primary
            .filter(BomLicense::has_identifier)
            .or_else(|| fallback.filter(BomLicense::has_identifier))
    }

    /// Classifies a declared license string.
    ///
    /// # Returns
    /// `None` for blank text and placeholder values such as `UNKNOWN`
    pub fn from_declaration(text: &str) -> Option<BomLicense> {
        let text = text.trim();
        if text.is_empty() || PLACEHOLDERS.iter().any(|p| text.eq_ignore_ascii_case(p)) {
            return None;
        }

        let mut license = BomLicense::default();
        if text.starts_with("http://") || text.starts_with("https://") {
            license.url = Some(text.to_string());
        } else if Self::is_expression(text) {
            license.expression = Some(text.to_string());
        } else if text.contains(char::is_whitespace) {
            license.name = Some(text.to_string());
        } else {
            license.id = Some(text.to_string());
        }
        Some(license)
    }

    /// Builds a license from the legacy `{ "type": …, "url": … }` object form.
    pub fn from_type_and_url(kind: Option<&str>, url: Option<&str>) -> Option<BomLicense> {
        let mut license = kind.and_then(Self::from_declaration).unwrap_or_default();
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            license.url = Some(url.to_string());
        }
        Some(license).filter(BomLicense::has_identifier)
    }

    fn is_expression(text: &str) -> bool {
        if text.starts_with('(') && text.ends_with(')') {
            return true;
        }
        text.split_whitespace()
            .any(|word| matches!(word, "AND" | "OR" | "WITH" | "and" | "or" | "with"))
    }
}
