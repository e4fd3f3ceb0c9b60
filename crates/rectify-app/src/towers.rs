// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

pub const PLACEHOLDER_LABEL: &str = "Select";

const STANDARD_TOWERS: [(&str, &[&str]); 3] = [
    ("TAPI", &["A Wing"]),
    ("AMAZON", &["A Wing", "B Wing"]),
    ("DANUBE", &["A Wing", "B Wing", "C Wing", "D Wing"]),
];

/// Immutable tower code to wing list mapping. Every wing list is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TowerWingTable {
    entries: Vec<(String, Vec<String>)>,
}

impl TowerWingTable {
    pub fn new<I, T, W, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, W)>,
        T: Into<String>,
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self {
            entries: Vec::new(),
        };
        for (tower, wings) in entries {
            let tower = tower.into();
            let wings = wings.into_iter().map(Into::into).collect::<Vec<String>>();
            if tower.trim().is_empty() {
                bail!("tower code must not be empty");
            }
            if wings.is_empty() {
                bail!("tower {tower:?} has no wings -- every tower needs at least one wing");
            }
            if table.wings(&tower).is_some() {
                bail!("tower {tower:?} is listed twice");
            }
            table.entries.push((tower, wings));
        }
        Ok(table)
    }

    pub fn standard() -> Self {
        Self {
            entries: STANDARD_TOWERS
                .iter()
                .map(|(tower, wings)| {
                    (
                        (*tower).to_owned(),
                        wings.iter().map(|wing| (*wing).to_owned()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn wings(&self, tower: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(code, _)| code == tower)
            .map(|(_, wings)| wings.as_slice())
    }

    pub fn contains(&self, tower: &str) -> bool {
        self.wings(tower).is_some()
    }

    pub fn towers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(code, _)| code.as_str())
    }
}

impl Default for TowerWingTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WingOption {
    pub value: String,
    pub label: String,
}

impl WingOption {
    fn placeholder() -> Self {
        Self {
            value: String::new(),
            label: PLACEHOLDER_LABEL.to_owned(),
        }
    }

    fn wing(name: &str) -> Self {
        Self {
            value: name.to_owned(),
            label: name.to_owned(),
        }
    }
}

/// Dependent wing select. The first option is always the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WingSelector {
    options: Vec<WingOption>,
    enabled: bool,
    selected: String,
}

impl Default for WingSelector {
    fn default() -> Self {
        Self {
            options: vec![WingOption::placeholder()],
            enabled: false,
            selected: String::new(),
        }
    }
}

impl WingSelector {
    pub fn options(&self) -> &[WingOption] {
        &self.options
    }

    pub fn wing_values(&self) -> Vec<&str> {
        self.options
            .iter()
            .skip(1)
            .map(|option| option.value.as_str())
            .collect()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn is_placeholder_selected(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selects `value` when it is one of the options; anything else falls
    /// back to the placeholder.
    pub fn select(&mut self, value: &str) -> bool {
        if self.options.iter().any(|option| option.value == value) {
            self.selected = value.to_owned();
            true
        } else {
            self.selected.clear();
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub fn resolve_wings(
    table: &TowerWingTable,
    selector: &mut WingSelector,
    tower: &str,
    desired_wing: Option<&str>,
) {
    selector.reset();

    let Some(wings) = table.wings(tower) else {
        return;
    };

    selector
        .options
        .extend(wings.iter().map(|wing| WingOption::wing(wing)));
    selector.enabled = true;
    if let Some(wing) = desired_wing {
        selector.select(wing);
    }
}

#[cfg(test)]
mod tests {
    use super::{PLACEHOLDER_LABEL, TowerWingTable, WingSelector, resolve_wings};

    #[test]
    fn every_known_tower_populates_its_wings_in_order() {
        let table = TowerWingTable::standard();
        for tower in table.towers() {
            let expected = table.wings(tower).expect("known tower");
            let mut selector = WingSelector::default();
            resolve_wings(&table, &mut selector, tower, Some(expected[0].as_str()));

            assert!(selector.is_enabled());
            assert_eq!(
                selector.wing_values(),
                expected.iter().map(String::as_str).collect::<Vec<_>>()
            );
            assert_eq!(selector.selected(), expected[0]);
            assert!(!selector.is_placeholder_selected());
        }
    }

    #[test]
    fn unknown_or_empty_tower_leaves_a_disabled_placeholder() {
        let table = TowerWingTable::standard();
        for tower in ["", "NILE", "danube"] {
            let mut selector = WingSelector::default();
            resolve_wings(&table, &mut selector, "AMAZON", Some("B Wing"));
            resolve_wings(&table, &mut selector, tower, Some("B Wing"));

            assert!(!selector.is_enabled());
            assert_eq!(selector.options().len(), 1);
            assert_eq!(selector.options()[0].label, PLACEHOLDER_LABEL);
            assert!(selector.is_placeholder_selected());
        }
    }

    #[test]
    fn unmatched_desired_wing_keeps_placeholder() {
        let table = TowerWingTable::standard();
        let mut selector = WingSelector::default();
        resolve_wings(&table, &mut selector, "TAPI", Some("C Wing"));

        assert!(selector.is_enabled());
        assert_eq!(selector.wing_values(), vec!["A Wing"]);
        assert!(selector.is_placeholder_selected());
    }

    #[test]
    fn custom_table_rejects_empty_wing_lists() {
        let error = TowerWingTable::new([("NILE", Vec::<String>::new())])
            .expect_err("empty wing list should fail");
        assert!(error.to_string().contains("at least one wing"));

        let table = TowerWingTable::new([("NILE", vec!["North", "South"])])
            .expect("valid table");
        assert_eq!(table.wings("NILE").map(<[String]>::len), Some(2));
        assert!(!table.contains("TAPI"));
    }

    #[test]
    fn duplicate_towers_are_rejected() {
        let error = TowerWingTable::new([("TAPI", vec!["A Wing"]), ("TAPI", vec!["B Wing"])])
            .expect_err("duplicate tower should fail");
        assert!(error.to_string().contains("listed twice"));
    }
}
