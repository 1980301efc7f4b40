//! Flat address-table rows.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use treeaudit_core::{Row, Value};

use super::GeneratorConfig;
use super::hierarchy::chance;

/// Columns that together identify an address.
pub const KEY_FIELDS: [&str; 4] = ["StateProvinceID", "City", "PostalCode", "AddressLine1"];

/// Column that may be null when `null_rate > 0`.
pub const NULLABLE_FIELD: &str = "City";

const CITIES: [&str; 8] = [
    "Bothell", "Renton", "Seattle", "Redmond", "Kenmore", "Everett", "Tacoma", "Issaquah",
];

/// Builds `table_rows` unique rows, each possibly followed by a copy of an
/// earlier row under a fresh `AddressID`.
pub fn build_table(config: &GeneratorConfig, rng: &mut StdRng) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::with_capacity(config.table_rows);
    let mut next_id: i64 = 1;

    for i in 0..config.table_rows {
        let city = if chance(rng, config.null_rate) {
            Value::Null
        } else {
            CITIES.choose(rng).copied().map_or(Value::Null, Value::from)
        };
        let state: i64 = rng.gen_range(1..=80);
        let postal: i64 = rng.gen_range(98_000..=98_999);
        rows.push(Row::from([
            ("AddressID".to_owned(), Value::from(next_id)),
            ("AddressLine1".to_owned(), Value::from(format!("{i} Main St"))),
            ("City".to_owned(), city),
            ("PostalCode".to_owned(), Value::from(postal.to_string())),
            ("StateProvinceID".to_owned(), Value::from(state)),
        ]));
        next_id += 1;

        if chance(rng, config.duplicate_rate) {
            let source = rng.gen_range(0..rows.len());
            let mut copy = rows[source].clone();
            copy.insert("AddressID".to_owned(), Value::from(next_id));
            rows.push(copy);
            next_id += 1;
        }
    }
    rows
}
