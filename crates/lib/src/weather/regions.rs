//! Region lookup table: display name to 6-digit JMA area code.

use std::collections::HashMap;

/// Any text containing this phrase resolves to the default region.
pub const TODAY_WEATHER_PHRASE: &str = "今日の天気";
pub const DEFAULT_REGION: &str = "東京";

const BUILTIN_REGIONS: &[(&str, &str)] = &[
    ("東京", "130000"),
    ("大阪", "270000"),
    ("北海道", "016000"),
    ("札幌", "016000"),
    ("宮城", "040000"),
    ("仙台", "040000"),
    ("神奈川", "140000"),
    ("横浜", "140000"),
    ("愛知", "230000"),
    ("名古屋", "230000"),
    ("京都", "260000"),
    ("広島", "340000"),
    ("福岡", "400000"),
    ("沖縄", "471000"),
    ("那覇", "471000"),
];

const EXAMPLE_REGIONS: &[&str] = &["東京", "大阪", "福岡"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub area_code: String,
}

/// Immutable after construction; shared read-only across requests.
#[derive(Debug, Clone)]
pub struct RegionTable {
    codes: HashMap<String, String>,
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RegionTable {
    pub fn builtin() -> Self {
        Self {
            codes: BUILTIN_REGIONS
                .iter()
                .map(|(name, code)| (name.to_string(), code.to_string()))
                .collect(),
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<Region> {
        self.codes.get(name).map(|code| Region {
            name: name.to_string(),
            area_code: code.clone(),
        })
    }

    pub fn examples(&self) -> Vec<&'static str> {
        EXAMPLE_REGIONS.to_vec()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Resolve user text to a region: the "today's weather" phrase anywhere means the
/// default region, otherwise the trimmed text must be a table key verbatim.
pub fn resolve_region(table: &RegionTable, text: &str) -> Option<Region> {
    let text = text.trim();
    if text.contains(TODAY_WEATHER_PHRASE) {
        return table.lookup(DEFAULT_REGION);
    }
    table.lookup(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokyo_maps_to_130000() {
        let table = RegionTable::builtin();
        let region = resolve_region(&table, "東京").unwrap();
        assert_eq!(region.area_code, "130000");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let table = RegionTable::builtin();
        assert_eq!(
            resolve_region(&table, "  大阪\n").map(|r| r.area_code),
            Some("270000".to_string())
        );
    }

    #[test]
    fn today_phrase_behaves_like_tokyo() {
        let table = RegionTable::builtin();
        let tokyo = resolve_region(&table, "東京");
        assert_eq!(resolve_region(&table, "今日の天気"), tokyo);
        assert_eq!(resolve_region(&table, "ねえ、今日の天気を教えて"), tokyo);
    }

    #[test]
    fn unmapped_region_is_none() {
        let table = RegionTable::builtin();
        assert_eq!(resolve_region(&table, "ロンドン"), None);
        assert_eq!(resolve_region(&table, "東京都"), None);
        assert_eq!(resolve_region(&table, ""), None);
    }

    #[test]
    fn every_code_is_six_digits() {
        for (name, code) in BUILTIN_REGIONS {
            assert_eq!(code.len(), 6, "{}", name);
            assert!(code.chars().all(|c| c.is_ascii_digit()), "{}", name);
        }
        assert_eq!(RegionTable::builtin().len(), BUILTIN_REGIONS.len());
    }
}
