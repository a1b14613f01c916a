// SPDX-License-Identifier: Apache-2.0

//! Protected relation list
//!
//! Parsing of the configured list and construction of the qualified target
//! name. Matching is exact, byte-for-byte and case-sensitive.

/// Split a configured list into its non-empty, whitespace-trimmed entries
pub fn parse_relation_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// `schema.table`, with no quoting or normalization
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}

/// Returns true if `qualified` equals one of the configured entries
pub fn is_protected(raw: &str, qualified: &str) -> bool {
    parse_relation_list(raw).into_iter().any(|entry| entry == qualified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_trims_and_drops_empty() {
        assert_eq!(
            parse_relation_list(" public.accounts , ,public.ledger,"),
            vec!["public.accounts", "public.ledger"]
        );
        assert!(parse_relation_list("").is_empty());
        assert!(parse_relation_list(" , ,").is_empty());
    }

    #[test]
    fn test_duplicates_are_harmless() {
        assert!(is_protected("public.ledger,public.ledger", "public.ledger"));
    }

    #[test]
    fn test_no_partial_matches() {
        assert!(!is_protected("public.ledger", "public.ledger_archive"));
        assert!(!is_protected("public.ledger_archive", "public.ledger"));
        assert!(!is_protected("ledger", "public.ledger"));
        assert!(!is_protected("public.*", "public.ledger"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!is_protected("Public.Accounts", "public.accounts"));
        assert!(is_protected("Public.Accounts", "Public.Accounts"));
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(qualified_name("public", "ledger"), "public.ledger");
    }

    fn ident() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,12}"
    }

    proptest! {
        #[test]
        fn whitespace_around_entries_never_matters(
            entries in prop::collection::vec((ident(), ident()), 1..6),
            pad in prop::collection::vec("[ \t]{0,3}", 12),
            pick in any::<prop::sample::Index>(),
        ) {
            let names: Vec<String> = entries.iter().map(|(s, t)| qualified_name(s, t)).collect();
            let tight = names.join(",");
            let loose = names
                .iter()
                .enumerate()
                .map(|(i, n)| format!("{}{}{}", pad[(2 * i) % pad.len()], n, pad[(2 * i + 1) % pad.len()]))
                .collect::<Vec<_>>()
                .join(",");

            prop_assert_eq!(parse_relation_list(&tight), parse_relation_list(&loose));

            let target = pick.get(&names);
            prop_assert!(is_protected(&tight, target));
            prop_assert!(is_protected(&loose, target));
        }

        #[test]
        fn upper_cased_entry_never_matches_lower_target(schema in ident(), table in ident()) {
            let target = qualified_name(&schema, &table);
            let configured = target.to_uppercase();
            prop_assume!(configured != target);
            prop_assert!(!is_protected(&configured, &target));
        }
    }
}
