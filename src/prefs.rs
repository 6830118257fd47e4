// prefs.rs

use crate::colorby::{parse_colorby, CategoryKind, ColorByError};
use crate::combine::synthesize_combined_column;
use crate::metadata::{MetadataTable, DEFAULT_CATEGORY};
use log::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPreference {
    pub column: String,
}

/// Plot categories keyed by label, in the order they were first requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    entries: Vec<(String, CategoryPreference)>,
}

impl Preferences {
    /// Inserts or replaces the entry for `label`. A replaced entry keeps its position.
    pub fn insert(&mut self, label: String, preference: CategoryPreference) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => *slot = preference,
            None => self.entries.push((label, preference)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&CategoryPreference> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, preference)| preference)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryPreference)> + '_ {
        self.entries
            .iter()
            .map(|(label, preference)| (label.as_str(), preference))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Turns an optional colorby string into plot preferences.
///
/// Without a colorby string (or with an empty one) samples are colored by
/// their ID under the label "Sample". Otherwise every category is checked
/// against the table; combined categories get a synthetic column, and the
/// table carrying those columns is returned alongside the preferences. Later
/// categories see columns added by earlier ones, and a repeated label keeps
/// the last column it was given.
pub fn resolve_preferences(
    colorby: Option<&str>,
    table: MetadataTable,
) -> Result<(Preferences, MetadataTable), ColorByError> {
    let mut prefs = Preferences::default();

    let spec = match colorby {
        Some(spec) if !spec.is_empty() => spec,
        _ => {
            info!(
                "No colorby categories given, coloring by '{}'.",
                table.sample_id_column()
            );
            prefs.insert(
                DEFAULT_CATEGORY.to_string(),
                CategoryPreference {
                    column: table.sample_id_column().to_string(),
                },
            );
            return Ok((prefs, table));
        }
    };

    let categories = parse_colorby(spec)?;
    debug!("Parsed {} colorby categories from '{}'.", categories.len(), spec);

    let mut table = table;
    for category in categories {
        let column = match category.kind {
            CategoryKind::Simple => {
                let column = category.source_columns[0].clone();
                if !table.has_column(&column) {
                    return Err(ColorByError::UnknownColumn { column });
                }
                column
            }
            CategoryKind::Combined => {
                let (updated, combined) =
                    synthesize_combined_column(table, &category.source_columns)?;
                table = updated;
                combined
            }
        };
        if let Some(previous) = prefs.get(&category.label) {
            debug!(
                "Category '{}' given again; column '{}' replaced by '{}'.",
                category.label, previous.column, column
            );
        }
        debug!("Category '{}' colored by column '{}'.", category.label, column);
        prefs.insert(category.label, CategoryPreference { column });
    }

    Ok((prefs, table))
}
