use quickcheck::QuickCheck;

use super::quickcheck_tests;
use crate::{
    CsvTable,
    csv::{escape, unescape},
};

#[test]
fn tables_survive_serialization() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(columns: Vec<String>, cells: Vec<String>) -> bool {
        let mut table = CsvTable::create(&columns);
        if !columns.is_empty() {
            for row in cells.chunks_exact(columns.len()) {
                if table.insert(row).is_err() {
                    return false;
                }
            }
        }
        CsvTable::parse(&table.to_bytes()).as_ref() == Ok(&table)
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Vec<String>, Vec<String>) -> bool);
}

#[test]
fn escape_is_undone_by_unescape() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(field: String) -> bool {
        let escaped = escape(&field);
        unescape(&escaped) == field && escape(&unescape(&escaped)) == escaped
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(String) -> bool);
}
