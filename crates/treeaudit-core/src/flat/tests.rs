#![allow(clippy::expect_used)]

use proptest::prelude::*;

use super::*;
use crate::test_helpers::{row, snapshot};

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_owned()).collect()
}

fn addresses() -> Dataset {
    let addr = |city: &str, line: &str, postal: Option<&str>| {
        row(&[
            ("City", Value::from(city)),
            ("AddressLine1", Value::from(line)),
            ("PostalCode", Value::from(postal)),
        ])
    };
    Dataset::new(
        "address",
        vec![
            addr("Bothell", "1 Main St", Some("98011")),
            addr("Bothell", "1 Main St", Some("98011")),
            addr("Bothell", "1 Main St", Some("98011")),
            addr("Seattle", "9 Pike St", None),
            addr("Seattle", "9 Pike St", None),
            addr("Renton", "4 Oak Ave", Some("98055")),
        ],
    )
}

#[test]
fn duplicate_rows_counts_surplus_rows() {
    let m = duplicate_rows(&addresses(), &keys(&["City", "AddressLine1", "PostalCode"]));
    // 3 rows in one group + 2 in another, minus the 2 groups.
    assert_eq!(m.actual, 3);
    assert_eq!(
        m.offenders,
        vec![
            Offender::DuplicateKey {
                key: keys(&["Bothell", "1 Main St", "98011"]),
                rows: vec![0, 1, 2],
            },
            Offender::DuplicateKey {
                key: keys(&["Seattle", "9 Pike St", "null"]),
                rows: vec![3, 4],
            },
        ]
    );
}

#[test]
fn absent_key_fields_group_with_nulls() {
    let ds = Dataset::new(
        "t",
        vec![
            row(&[("a", Value::from(1_i64))]),
            row(&[("a", Value::from(1_i64)), ("b", Value::Null)]),
        ],
    );
    assert_eq!(duplicate_rows(&ds, &keys(&["a", "b"])).actual, 1);
}

#[test]
fn integer_and_string_keys_are_distinct() {
    let ds = Dataset::new(
        "t",
        vec![
            row(&[("a", Value::from(1_i64))]),
            row(&[("a", Value::from("1"))]),
        ],
    );
    assert_eq!(duplicate_rows(&ds, &keys(&["a"])).actual, 0);
}

#[test]
fn duplicate_rows_rule_needs_keys() {
    let err = DuplicateRows::new("t", Vec::new()).expect_err("no keys");
    assert!(matches!(err, AuditError::InvalidCatalog { .. }), "{err:?}");
}

#[test]
fn forbidden_nulls_lists_fields_per_row() {
    let m = forbidden_nulls(&addresses(), &keys(&["PostalCode", "Country", "City"]));
    assert_eq!(m.actual, 6, "Country is absent everywhere");
    assert_eq!(
        m.offenders[3],
        Offender::NullFields {
            row: 3,
            fields: keys(&["PostalCode", "Country"]),
        }
    );
}

#[test]
fn forbidden_nulls_passes_complete_rows() {
    let m = forbidden_nulls(&addresses(), &keys(&["City", "AddressLine1"]));
    assert_eq!(m.actual, 0);
}

#[test]
fn empty_dataset_measures_zero() {
    let snap = snapshot(vec![Dataset::new("address", Vec::new())]);
    let dup = DuplicateRows::new("address", keys(&["City"])).expect("rule");
    let nulls = ForbiddenNulls::new("address", keys(&["City"])).expect("rule");
    let fmt = FormatViolation::new("address", "City", FormatPredicate::Uppercase);
    assert_eq!(dup.measure(&snap).expect("dup").actual, 0);
    assert_eq!(nulls.measure(&snap).expect("nulls").actual, 0);
    assert_eq!(fmt.measure(&snap).expect("fmt").actual, 0);
}

#[test]
fn missing_dataset_is_an_error() {
    let snap = snapshot(Vec::new());
    let err = ForbiddenNulls::new("address", keys(&["City"]))
        .expect("rule")
        .measure(&snap)
        .expect_err("missing");
    assert_eq!(
        err,
        AuditError::MissingDataset {
            name: "address".to_owned()
        }
    );
}

#[test]
fn uppercase_rejects_lower_case_and_padding() {
    let p = FormatPredicate::Uppercase;
    assert!(!p.rejects(&Value::from("CM")));
    assert!(p.rejects(&Value::from("cm")));
    assert!(p.rejects(&Value::from("CM ")));
    assert!(p.rejects(&Value::from("Cm")));
    assert!(!p.rejects(&Value::from("M2")));
    assert!(!p.rejects(&Value::Null));
    assert!(!p.rejects(&Value::from(5_i64)));
}

#[test]
fn uppercase_only_folds_ascii_letters() {
    let p = FormatPredicate::Uppercase;
    assert!(!p.rejects(&Value::from("STRAẞE")));
    assert!(!p.rejects(&Value::from("GROß")));
    assert!(!p.rejects(&Value::from("µM")));
    assert!(p.rejects(&Value::from("µm")));
}

#[test]
fn not_numeric_rejects_numeric_text_and_numbers() {
    let p = FormatPredicate::NotNumeric;
    for numeric in ["12", " 3.5 ", "-1", "+.5", "1e3", "7."] {
        assert!(p.rejects(&Value::from(numeric)), "{numeric:?}");
    }
    for text in ["CM", "1A", "e5", "", "1.2.3"] {
        assert!(!p.rejects(&Value::from(text)), "{text:?}");
    }
    assert!(p.rejects(&Value::from(42_i64)));
    assert!(p.rejects(&Value::from(4.2_f64)));
    assert!(!p.rejects(&Value::from(true)));
    assert!(!p.rejects(&Value::Null));
}

#[test]
fn pattern_must_match_the_whole_value() {
    let p = FormatPredicate::pattern("[A-Z]{2,3}").expect("compile");
    assert!(!p.rejects(&Value::from("KGM")));
    assert!(p.rejects(&Value::from("KGMX")));
    assert!(p.rejects(&Value::from("xKG")));

    let digits = FormatPredicate::pattern(r"\d+").expect("compile");
    assert!(!digits.rejects(&Value::from(17_i64)));
}

#[test]
fn invalid_pattern_is_a_catalogue_error() {
    let err = FormatPredicate::pattern("(").expect_err("bad regex");
    assert!(matches!(err, AuditError::InvalidCatalog { .. }), "{err:?}");
}

#[test]
fn format_violations_report_row_and_value() {
    let ds = Dataset::new(
        "units",
        vec![
            row(&[("code", Value::from("KG"))]),
            row(&[("code", Value::from("kg"))]),
            row(&[("code", Value::Null)]),
            row(&[("code", Value::from("10"))]),
        ],
    );
    let upper = format_violations(&ds, "code", &FormatPredicate::Uppercase);
    assert_eq!(
        upper.offenders,
        vec![Offender::Format {
            row: 1,
            value: "kg".to_owned()
        }]
    );
    let numeric = format_violations(&ds, "code", &FormatPredicate::NotNumeric);
    assert_eq!(numeric.actual, 1);
}

fn arb_rows() -> impl Strategy<Value = Vec<(u8, Option<u8>)>> {
    prop::collection::vec((0_u8..4, prop::option::of(0_u8..3)), 0..40)
}

fn to_dataset(rows: &[(u8, Option<u8>)]) -> Dataset {
    Dataset::new(
        "t",
        rows.iter()
            .map(|(a, b)| {
                row(&[
                    ("a", Value::from(i64::from(*a))),
                    ("b", Value::from(b.map(|b| format!("v{b}")))),
                ])
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn duplicate_count_ignores_row_order(
        rows in arb_rows(),
        seed in any::<prop::sample::Index>(),
    ) {
        let fields = keys(&["a", "b"]);
        let before = duplicate_rows(&to_dataset(&rows), &fields).actual;

        let mut shuffled = rows.clone();
        if !shuffled.is_empty() {
            let k = seed.index(shuffled.len());
            shuffled.rotate_left(k);
            shuffled.reverse();
        }
        let after = duplicate_rows(&to_dataset(&shuffled), &fields).actual;
        prop_assert_eq!(before, after);
    }

    #[test]
    fn duplicate_count_is_rows_minus_distinct_keys(rows in arb_rows()) {
        let distinct: std::collections::BTreeSet<_> = rows.iter().collect();
        let m = duplicate_rows(&to_dataset(&rows), &keys(&["a", "b"]));
        prop_assert_eq!(m.actual, (rows.len() - distinct.len()) as u64);
    }
}
