pub mod csv_table;
pub mod frame;
pub mod missing;
pub mod polars_utils;
pub mod profile;

pub use csv_table::{CsvTable, read_csv_table, read_csv_table_from_reader, write_csv_table};
pub use frame::{read_csv_frame, table_to_frame};
pub use missing::{
    KNOWN_SENTINELS, MISSING_CODE, NOT_APPLICABLE_CODE, is_blank, is_missing_value, sentinel_code,
};
pub use polars_utils::{any_to_string, column_strings, format_numeric, parse_f64, parse_i64};
pub use profile::{ColumnProfile, profile_columns};
