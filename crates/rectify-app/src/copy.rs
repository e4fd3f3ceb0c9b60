// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::forms::FormState;
use crate::towers::TowerWingTable;
use crate::{TOWER, WING};

/// Copies one field from `primary` into `secondary`. Returns false when
/// either form lacks the field.
///
/// Copying the tower rebuilds the secondary wing options. Copying the wing
/// first copies the tower, rebuilds, and only then assigns the wing, so the
/// wing value always lands on an existing option.
pub fn copy_field(
    table: &TowerWingTable,
    primary: &FormState,
    secondary: &mut FormState,
    name: &str,
) -> bool {
    if !secondary.has_field(name) {
        return false;
    }
    let Some(value) = primary.value(name) else {
        return false;
    };

    match name {
        TOWER => {
            secondary.change_tower(table, value, None);
        }
        WING => {
            let tower = primary.value(TOWER).unwrap_or_default();
            secondary.change_tower(table, tower, None);
            secondary.set_value(WING, value);
        }
        _ => {
            secondary.set_value(name, value);
        }
    }
    true
}

/// Copies every secondary field that has a primary counterpart, in form
/// order. Returns the number of fields copied.
pub fn copy_all(table: &TowerWingTable, primary: &FormState, secondary: &mut FormState) -> usize {
    secondary
        .specs()
        .iter()
        .filter(|spec| copy_field(table, primary, secondary, spec.name))
        .count()
}
