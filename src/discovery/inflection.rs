//! Table-name singularization for matching `id` keys.
//!
//! `users.id` is referenced as `user_id`; matching needs the singular form of
//! the table name. Irregular plurals common in schemas are handled before
//! falling back to the `inflector` crate.

use inflector::Inflector;

static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("analysis", "analyses"),
    ("basis", "bases"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
];

/// Lower-cased singular form of a table name.
pub fn singular_table_name(table: &str) -> String {
    let lower = table.to_lowercase();
    if lower.is_empty() {
        return lower;
    }

    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *plural || lower == *singular {
            return singular.to_string();
        }
    }

    lower.to_singular()
}
