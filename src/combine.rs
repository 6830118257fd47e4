// combine.rs

use crate::colorby::{ColorByError, COMBINE_SEPARATOR};
use crate::metadata::MetadataTable;
use log::debug;

/// Adds a synthetic column to `table` whose value for each sample is the
/// sample's values of `source_columns` joined with `&&`. The new column is
/// named by joining the column names the same way.
///
/// Asking for a combination that already exists returns the table unchanged,
/// so the same combination never produces a duplicate column.
pub fn synthesize_combined_column(
    table: MetadataTable,
    source_columns: &[String],
) -> Result<(MetadataTable, String), ColorByError> {
    let source_values = source_columns
        .iter()
        .map(|column| {
            table
                .column_values(column)
                .ok_or_else(|| ColorByError::UnknownColumn {
                    column: column.clone(),
                })
        })
        .collect::<Result<Vec<Vec<&str>>, ColorByError>>()?;

    let combined_name = source_columns.join(COMBINE_SEPARATOR);
    if table.has_column(&combined_name) {
        debug!("Combined column '{}' already present, reusing it.", combined_name);
        return Ok((table, combined_name));
    }

    let combined_values: Vec<String> = (0..table.rows().len())
        .map(|row| {
            source_values
                .iter()
                .map(|values| values[row])
                .collect::<Vec<&str>>()
                .join(COMBINE_SEPARATOR)
        })
        .collect();

    debug!(
        "Adding combined column '{}' over {} samples.",
        combined_name,
        combined_values.len()
    );
    let table = table.with_appended_column(combined_name.clone(), combined_values);
    Ok((table, combined_name))
}
