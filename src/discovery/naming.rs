//! Name-based matching of foreign keys to primary keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::inflection::singular_table_name;
use super::{CandidateMatch, ColumnRef};

/// How `_id` is removed when computing a base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameNormalization {
    /// Strip a single trailing `_id`: `user_id` -> `user`, `id_user` stays.
    #[default]
    Suffix,
    /// Remove every `_id` occurrence anywhere in the name.
    Substring,
}

/// Lower-case the name and remove `_id` per the normalization mode.
pub fn base_name(field: &str, mode: NameNormalization) -> String {
    let lower = field.to_lowercase();
    match mode {
        NameNormalization::Suffix => lower
            .strip_suffix("_id")
            .map(str::to_string)
            .unwrap_or(lower),
        NameNormalization::Substring => lower.replace("_id", ""),
    }
}

/// Names a pk candidate is known by. A pk literally named `id` also answers
/// to its singular table name, so `users.id` is found by `user_id`.
fn pk_keys(pk: &ColumnRef, mode: NameNormalization) -> Vec<String> {
    let mut keys = vec![base_name(&pk.field, mode)];
    if pk.field.eq_ignore_ascii_case("id") {
        let singular = singular_table_name(&pk.table);
        if !keys.contains(&singular) {
            keys.push(singular);
        }
    }
    keys
}

/// Pair each fk with every pk sharing its base name in a different table.
///
/// Output is in fk order, then pk order.
pub fn match_candidates(
    pks: &[ColumnRef],
    fks: &[ColumnRef],
    mode: NameNormalization,
) -> Vec<CandidateMatch> {
    let mut by_base: HashMap<String, Vec<&ColumnRef>> = HashMap::new();
    for pk in pks {
        for key in pk_keys(pk, mode) {
            by_base.entry(key).or_default().push(pk);
        }
    }

    let mut matches = Vec::new();
    for fk in fks {
        let Some(targets) = by_base.get(&base_name(&fk.field, mode)) else {
            continue;
        };
        for pk in targets {
            if pk.table != fk.table {
                matches.push(CandidateMatch::new((*pk).clone(), fk.clone()));
            }
        }
    }
    matches
}
