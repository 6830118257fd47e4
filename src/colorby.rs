// colorby.rs

use thiserror::Error;

/// Separator between categories in a colorby string.
pub const CATEGORY_SEPARATOR: char = ',';

/// Joins columns of a combined category, both in the column name and in its values.
pub const COMBINE_SEPARATOR: &str = "&&";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorByError {
    #[error("malformed colorby token '{token}' in '{spec}': categories and combined columns must not be empty")]
    SpecFormat { spec: String, token: String },

    #[error("column '{column}' not found in mapping data")]
    UnknownColumn { column: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Simple,
    Combined,
}

/// One comma-separated token of a colorby string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCategory {
    pub label: String,
    pub kind: CategoryKind,
    pub source_columns: Vec<String>,
}

impl ColorCategory {
    fn from_token(spec: &str, token: &str) -> Result<Self, ColorByError> {
        let malformed = || ColorByError::SpecFormat {
            spec: spec.to_string(),
            token: token.to_string(),
        };
        if token.is_empty() {
            return Err(malformed());
        }
        if !token.contains(COMBINE_SEPARATOR) {
            return Ok(Self {
                label: token.to_string(),
                kind: CategoryKind::Simple,
                source_columns: vec![token.to_string()],
            });
        }
        let source_columns: Vec<String> = token
            .split(COMBINE_SEPARATOR)
            .map(str::to_string)
            .collect();
        if source_columns.iter().any(String::is_empty) {
            return Err(malformed());
        }
        Ok(Self {
            label: token.to_string(),
            kind: CategoryKind::Combined,
            source_columns,
        })
    }
}

/// Splits a colorby string such as `Day,Type&&Day` into categories, one per
/// token and in input order. Tokens are used verbatim; nothing is trimmed.
pub fn parse_colorby(spec: &str) -> Result<Vec<ColorCategory>, ColorByError> {
    spec.split(CATEGORY_SEPARATOR)
        .map(|token| ColorCategory::from_token(spec, token))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{collection::vec, prop_assert_eq, proptest};
    use rstest::rstest;

    #[test]
    fn one_category_per_token_in_order() {
        let categories = parse_colorby("Day,Type,Treatment").unwrap();
        let labels: Vec<&str> = categories.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Day", "Type", "Treatment"]);
        assert!(categories.iter().all(|c| c.kind == CategoryKind::Simple));
        assert_eq!(categories[1].source_columns, ["Type"]);
    }

    #[test]
    fn combined_token_keeps_its_label_and_column_order() {
        let categories = parse_colorby("Day,Type&&Day&&Site").unwrap();
        assert_eq!(categories.len(), 2);
        let combined = &categories[1];
        assert_eq!(combined.kind, CategoryKind::Combined);
        assert_eq!(combined.label, "Type&&Day&&Site");
        assert_eq!(combined.source_columns, ["Type", "Day", "Site"]);
    }

    #[test]
    fn whitespace_is_part_of_the_token() {
        let categories = parse_colorby("Day, Type").unwrap();
        assert_eq!(categories[1].label, " Type");
    }

    #[rstest]
    #[case::empty_spec("", "")]
    #[case::trailing_comma("Day,", "")]
    #[case::double_comma("Day,,Type", "")]
    #[case::leading_combine("&&Day", "&&Day")]
    #[case::trailing_combine("Type&&", "Type&&")]
    #[case::empty_middle_column("Type&&&&Day", "Type&&&&Day")]
    fn malformed_tokens_are_rejected(#[case] spec: &str, #[case] bad_token: &str) {
        match parse_colorby(spec).unwrap_err() {
            ColorByError::SpecFormat { token, .. } => assert_eq!(token, bad_token),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn well_formed_specs_yield_one_category_per_token(
            tokens in vec(vec("[A-Za-z0-9_ #.-]{1,8}", 1..4), 1..6)
        ) {
            let labels: Vec<String> = tokens
                .iter()
                .map(|columns| columns.join(COMBINE_SEPARATOR))
                .collect();
            let separator = CATEGORY_SEPARATOR.to_string();
            let spec = labels.join(separator.as_str());
            let categories = parse_colorby(&spec).unwrap();

            prop_assert_eq!(categories.len(), tokens.len());
            for ((category, label), columns) in categories.iter().zip(&labels).zip(&tokens) {
                prop_assert_eq!(&category.label, label);
                prop_assert_eq!(&category.source_columns, columns);
                let expected_kind = if columns.len() == 1 {
                    CategoryKind::Simple
                } else {
                    CategoryKind::Combined
                };
                prop_assert_eq!(category.kind, expected_kind);
            }
        }
    }
}
