//! # `deskrep-xlsx`: spreadsheet export
//!
//! Serializes the two report row sequences into a two-sheet workbook:
//! `Default` for the flattened default fields, `Custom Fields` for the
//! custom-field leaves. Row order is preserved as handed in.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use deskrep::{CustomFieldRow, FieldRow};

const DEFAULT_SHEET_COLUMNS: [&str; 4] = ["Label", "Value", "API Name", "Mandatory"];
const CUSTOM_SHEET_COLUMNS: [&str; 7] = [
    "Label",
    "API Name",
    "Placeholder",
    "Field Type",
    "Drop Down Values",
    "Dependent Fields",
    "Dependent Field Value",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] XlsxError),
}

/// Writes `<file_stem>.xlsx` into the current directory and returns the
/// path.
pub fn write_report(
    default_rows: &[FieldRow],
    custom_rows: &[CustomFieldRow],
    file_stem: &str,
) -> Result<PathBuf, ExportError> {
    let path = PathBuf::from(format!("{file_stem}.xlsx"));
    write_report_to(default_rows, custom_rows, &path)?;
    Ok(path)
}

/// Writes the workbook to an explicit path.
pub fn write_report_to(
    default_rows: &[FieldRow],
    custom_rows: &[CustomFieldRow],
    path: &Path,
) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet().set_name("Default")?;
    for (col, title) in DEFAULT_SHEET_COLUMNS.iter().enumerate() {
        sheet.write_with_format(0, col as u16, *title, &header_format)?;
    }
    for (index, row) in default_rows.iter().enumerate() {
        let r = index as u32 + 1;
        sheet.write(r, 0, row.label.as_str())?;
        sheet.write(r, 1, row.value.as_str())?;
        if let Some(api_name) = &row.api_name {
            sheet.write(r, 2, api_name.as_str())?;
        }
        if let Some(mandatory) = row.mandatory {
            sheet.write_boolean(r, 3, mandatory)?;
        }
    }

    let sheet = workbook.add_worksheet().set_name("Custom Fields")?;
    for (col, title) in CUSTOM_SHEET_COLUMNS.iter().enumerate() {
        sheet.write_with_format(0, col as u16, *title, &header_format)?;
    }
    for (index, row) in custom_rows.iter().enumerate() {
        let r = index as u32 + 1;
        sheet.write(r, 0, row.label.as_str())?;
        sheet.write(r, 1, row.name.as_str())?;
        sheet.write(r, 2, row.placeholder.as_str())?;
        sheet.write(r, 3, row.field_type.as_str())?;
        sheet.write(r, 4, row.drop_down_values.as_str())?;
        sheet.write(r, 5, row.dependent_fields.as_str())?;
        sheet.write(r, 6, row.dependent_field_value.as_str())?;
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> (Vec<FieldRow>, Vec<CustomFieldRow>) {
        let default_rows = vec![
            FieldRow {
                id: "name".to_string(),
                label: "Name".to_string(),
                value: "MacBook Pro".to_string(),
                api_name: Some("name".to_string()),
                mandatory: None,
            },
            FieldRow {
                id: "subject".to_string(),
                label: "Subject".to_string(),
                value: "Need a laptop".to_string(),
                api_name: Some("subject".to_string()),
                mandatory: Some(true),
            },
        ];
        let custom_rows = vec![CustomFieldRow {
            id: "color_1".to_string(),
            label: "Color".to_string(),
            name: "color_1".to_string(),
            field_type: "custom_dropdown".to_string(),
            drop_down_values: "Red, Blue".to_string(),
            ..CustomFieldRow::default()
        }];
        (default_rows, custom_rows)
    }

    #[test]
    fn writes_a_two_sheet_workbook() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.xlsx");
        let (default_rows, custom_rows) = sample_rows();

        write_report_to(&default_rows, &custom_rows, &path).expect("workbook should save");

        let metadata = std::fs::metadata(&path).expect("file should exist");
        assert!(metadata.len() > 0);
    }

    #[test]
    fn handles_empty_row_sets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.xlsx");

        write_report_to(&[], &[], &path).expect("workbook should save");
        assert!(path.exists());
    }
}
