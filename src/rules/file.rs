//! JSON rule files.
//!
//! Two shapes are understood:
//!
//! ```json
//! { "rule_type": "table", "rules": [ { "pattern": [0, 1, 1, 1, 0], "result": 1 } ] }
//! { "rule_type": "totalistic", "totalistic": { "(0, 3)": 1, "(1, 2)": 1 } }
//! ```
//!
//! Both may carry a free-form `metadata` object. When `rule_type` is absent
//! the kind is inferred from which of `rules` / `totalistic` is present.

use crate::error::{Error, Result};
use crate::grid::CellState;
use crate::rules::table::RuleTable;
use crate::rules::totalistic::{TotalisticTable, MAX_NEIGHBORS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One row of a pattern table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub pattern: Vec<CellState>,
    pub result: CellState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Table,
    Totalistic,
}

/// On-disk rule set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totalistic: Option<BTreeMap<String, CellState>>,
}

impl RuleFile {
    /// Wrap a pattern table
    pub fn from_table<const N: usize>(table: &RuleTable<N>) -> Self {
        Self {
            metadata: BTreeMap::new(),
            rule_type: Some("table".to_string()),
            rules: Some(table.to_entries()),
            totalistic: None,
        }
    }

    /// Wrap a totalistic table. Keys are written as `"(state, count)"`.
    pub fn from_totalistic(table: &TotalisticTable) -> Self {
        let map = table
            .iter()
            .map(|(&(state, count), &result)| (format!("({}, {})", state, count), result))
            .collect();
        Self {
            metadata: BTreeMap::new(),
            rule_type: Some("totalistic".to_string()),
            rules: None,
            totalistic: Some(map),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Which kind of rule set this file holds
    pub fn kind(&self) -> Result<RuleKind> {
        match self.rule_type.as_deref() {
            Some("table") => Ok(RuleKind::Table),
            Some("totalistic") => Ok(RuleKind::Totalistic),
            Some(other) => Err(Error::RuleParse(format!("unknown rule_type {:?}", other))),
            None if self.rules.is_some() => Ok(RuleKind::Table),
            None if self.totalistic.is_some() => Ok(RuleKind::Totalistic),
            None => Err(Error::RuleParse(
                "rule file has neither `rules` nor `totalistic`".to_string(),
            )),
        }
    }

    /// Decode as a pattern table of arity `N`
    pub fn to_table<const N: usize>(&self) -> Result<RuleTable<N>> {
        match (self.kind()?, &self.rules) {
            (RuleKind::Table, Some(entries)) => RuleTable::from_entries(entries),
            (RuleKind::Table, None) => Ok(RuleTable::new()),
            (RuleKind::Totalistic, _) => Err(Error::RuleParse(
                "expected a table rule file, found totalistic".to_string(),
            )),
        }
    }

    /// Decode as a totalistic table
    pub fn to_totalistic(&self) -> Result<TotalisticTable> {
        match (self.kind()?, &self.totalistic) {
            (RuleKind::Totalistic, Some(map)) => map
                .iter()
                .map(|(key, &result)| parse_pair_key(key).map(|pair| (pair, result)))
                .collect(),
            (RuleKind::Totalistic, None) => Ok(TotalisticTable::new()),
            (RuleKind::Table, _) => Err(Error::RuleParse(
                "expected a totalistic rule file, found table".to_string(),
            )),
        }
    }

    /// Number of rules held
    pub fn rule_count(&self) -> usize {
        self.rules.as_ref().map_or(0, Vec::len) + self.totalistic.as_ref().map_or(0, BTreeMap::len)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let file: RuleFile = serde_json::from_str(&json)?;
        file.kind()?;
        Ok(file)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Parse `"(state, count)"`, tolerating whitespace and missing parentheses.
/// The count is a Moore neighbor count and must not exceed 8.
fn parse_pair_key(key: &str) -> Result<(CellState, u8)> {
    let bad = || Error::RuleParse(format!("invalid totalistic key {:?}", key));

    let inner = key.trim().trim_start_matches('(').trim_end_matches(')');
    let (a, b) = inner.split_once(',').ok_or_else(bad)?;
    let state = a.trim().parse::<CellState>().map_err(|_| bad())?;
    let count = b.trim().parse::<u8>().map_err(|_| bad())?;
    if count > MAX_NEIGHBORS {
        return Err(Error::RuleParse(format!(
            "totalistic key {:?}: neighbor count {} out of range 0-{}",
            key, count, MAX_NEIGHBORS
        )));
    }
    Ok((state, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::BirthSurvival;

    #[test]
    fn test_table_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.json");

        let table: RuleTable<5> = [([0, 1, 1, 1, 0], 1), ([3, 1, 0, 0, 0], 1)]
            .into_iter()
            .collect();
        RuleFile::from_table(&table)
            .with_metadata("name", "test loop")
            .save(&path)
            .unwrap();

        let loaded = RuleFile::load(&path).unwrap();
        assert_eq!(loaded.kind().unwrap(), RuleKind::Table);
        assert_eq!(loaded.metadata["name"], "test loop");
        assert_eq!(loaded.to_table::<5>().unwrap(), table);
    }

    #[test]
    fn test_totalistic_file_roundtrip() {
        let table = BirthSurvival::CONWAY.to_table(2);
        let file = RuleFile::from_totalistic(&table);
        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains("\"(0, 3)\":1"));

        let back: RuleFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_totalistic().unwrap(), table);
    }

    #[test]
    fn test_kind_inferred_without_rule_type() {
        let json = r#"{ "totalistic": { "(0,3)": 1, " ( 1 , 2 ) ": 1 } }"#;
        let file: RuleFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.kind().unwrap(), RuleKind::Totalistic);

        let table = file.to_totalistic().unwrap();
        assert_eq!(table.get(1, 2), Some(1));
    }

    #[test]
    fn test_kind_mismatch() {
        let file = RuleFile::from_totalistic(&BirthSurvival::CONWAY.to_table(2));
        assert!(matches!(file.to_table::<5>(), Err(Error::RuleParse(_))));
        assert!(RuleFile::default().kind().is_err());
    }

    #[test]
    fn test_bad_key() {
        let json = r#"{ "rule_type": "totalistic", "totalistic": { "zero-three": 1 } }"#;
        let file: RuleFile = serde_json::from_str(json).unwrap();
        assert!(matches!(file.to_totalistic(), Err(Error::RuleParse(_))));
    }

    #[test]
    fn test_count_above_moore_range_rejected() {
        let json = r#"{ "rule_type": "totalistic", "totalistic": { "(0, 3)": 1, "(1, 9)": 1 } }"#;
        let file: RuleFile = serde_json::from_str(json).unwrap();
        assert!(matches!(file.to_totalistic(), Err(Error::RuleParse(msg)) if msg.contains("out of range")));

        let edge = r#"{ "rule_type": "totalistic", "totalistic": { "(1, 8)": 1 } }"#;
        let file: RuleFile = serde_json::from_str(edge).unwrap();
        assert_eq!(file.to_totalistic().unwrap().len(), 1);
    }
}
