use keyscout::discovery::fallback::cross_match;
use keyscout::discovery::{base_name, match_candidates, ColumnRef, NameNormalization};
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z_]{0,8}(_id)?").unwrap()
}

fn columns(max: usize) -> impl Strategy<Value = Vec<ColumnRef>> {
    // few table names so collisions are common
    let table = prop_oneof![Just("users"), Just("orders"), Just("items"), Just("teams")];
    proptest::collection::vec((table, ident()), 0..=max)
        .prop_map(|cols| cols.into_iter().map(|(t, f)| ColumnRef::new(t, f)).collect())
}

fn mode() -> impl Strategy<Value = NameNormalization> {
    prop_oneof![
        Just(NameNormalization::Suffix),
        Just(NameNormalization::Substring)
    ]
}

proptest! {
    #[test]
    fn name_matches_never_pair_a_table_with_itself(
        pks in columns(8),
        fks in columns(8),
        mode in mode(),
    ) {
        for m in match_candidates(&pks, &fks, mode) {
            prop_assert_ne!(&m.pk.table, &m.fk.table);
            prop_assert!(pks.contains(&m.pk));
            prop_assert!(fks.contains(&m.fk));
        }
    }

    #[test]
    fn cross_match_covers_every_cross_table_pair(pks in columns(6), fks in columns(6)) {
        let pairs = cross_match(&pks, &fks);
        let expected = pks
            .iter()
            .map(|pk| fks.iter().filter(|fk| fk.table != pk.table).count())
            .sum::<usize>();
        prop_assert_eq!(pairs.len(), expected);
        prop_assert!(pairs.iter().all(|m| m.pk.table != m.fk.table));
    }

    #[test]
    fn base_name_is_lowercase(field in "[A-Za-z_]{1,12}", mode in mode()) {
        let base = base_name(&field, mode);
        prop_assert_eq!(base.clone(), base.to_lowercase());
    }
}
