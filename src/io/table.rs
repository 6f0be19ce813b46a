//! Whitespace-delimited table reading and writing.
//!
//! CHARISMA files have no header row and separate fields by runs of whitespace. The `csv`
//! reader is configured with a single-space delimiter in flexible mode; each record is then
//! re-split on whitespace so runs of spaces (empty fields) and embedded tabs collapse.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::{CharismaError, CharismaResult};
use crate::format::ColumnSpec;
use crate::types::{Column, Table};

/// Reader configuration shared by every CHARISMA read.
pub fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(b' ')
        .flexible(true)
        .trim(csv::Trim::None);
    builder
}

/// Writer configuration shared by every CHARISMA write.
pub fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.has_headers(false).delimiter(b' ');
    builder
}

/// Read `columns` of a `spec`-layout file into a [`Table`].
///
/// Rules:
///
/// - Lines have no header.
/// - Each requested column is taken by its position in the layout; other tokens (markers,
///   separators, trailing extras) are never parsed.
/// - Blank lines are skipped.
pub fn read_table_from_path(
    path: impl AsRef<Path>,
    spec: ColumnSpec,
    columns: &[Column],
) -> CharismaResult<Table> {
    let mut rdr = reader_builder().from_path(path)?;
    read_table_from_reader(&mut rdr, spec, columns)
}

/// Read `columns` of a `spec`-layout table from an existing CSV reader.
pub fn read_table_from_reader<R: Read>(
    rdr: &mut csv::Reader<R>,
    spec: ColumnSpec,
    columns: &[Column],
) -> CharismaResult<Table> {
    // Map requested columns -> token positions within a line.
    let mut positions = Vec::with_capacity(columns.len());
    for column in columns {
        match spec.position(*column) {
            Some(pos) => positions.push(pos),
            None => {
                return Err(CharismaError::Format {
                    message: format!("column '{column}' is not part of the {spec:?} layout"),
                });
            }
        }
    }
    let needed = positions.iter().max().map_or(0, |p| p + 1);

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (idx0, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map_or(idx0 + 1, |p| p.line() as usize);

        let tokens: Vec<&str> = record.iter().flat_map(str::split_whitespace).collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < needed {
            return Err(CharismaError::Parse {
                row: line,
                column: spec.columns()[tokens.len()].name().to_string(),
                raw: tokens.join(" "),
                message: format!("expected at least {needed} fields, found {}", tokens.len()),
            });
        }

        let mut row = Vec::with_capacity(columns.len());
        for (column, &pos) in columns.iter().zip(positions.iter()) {
            row.push(parse_number(line, *column, tokens[pos])?);
        }
        rows.push(row);
    }

    Ok(Table::new(columns.to_vec(), rows))
}

fn parse_number(row: usize, column: Column, raw: &str) -> CharismaResult<f64> {
    raw.parse::<f64>().map_err(|e| CharismaError::Parse {
        row,
        column: column.name().to_string(),
        raw: raw.to_owned(),
        message: e.to_string(),
    })
}

/// A reduced-layout output row.
pub type ReducedRow = (i32, i32, f32);

/// Write reduced-layout rows to `path`, single-space separated and without a header.
pub fn write_reduced_to_path(path: impl AsRef<Path>, rows: &[ReducedRow]) -> CharismaResult<()> {
    let mut wtr = writer_builder().from_path(path)?;
    write_reduced_to_writer(&mut wtr, rows)
}

/// Write reduced-layout rows to an existing CSV writer.
pub fn write_reduced_to_writer<W: Write>(
    wtr: &mut csv::Writer<W>,
    rows: &[ReducedRow],
) -> CharismaResult<()> {
    for &(inline, crossline, depth) in rows {
        wtr.write_record([inline.to_string(), crossline.to_string(), format_depth(depth)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Depths are always written as floating values (`100.0`, not `100`).
fn format_depth(depth: f32) -> String {
    let s = depth.to_string();
    if depth.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{s}.0")
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::{format_depth, read_table_from_reader, reader_builder, write_reduced_to_writer};
    use crate::error::CharismaError;
    use crate::format::ColumnSpec;
    use crate::types::Column;

    const REDUCED: [Column; 3] = [Column::Inline, Column::Crossline, Column::Depth];

    #[test]
    fn reads_reduced_rows_with_runs_of_whitespace() {
        let input = "10 20 1500.5\n11   21\t1501\n\n  12 22 1502.25  \n";
        let mut rdr = reader_builder().from_reader(input.as_bytes());
        let t = read_table_from_reader(&mut rdr, ColumnSpec::Reduced, &REDUCED).unwrap();
        assert_eq!(
            t.rows,
            vec![
                vec![10.0, 20.0, 1500.5],
                vec![11.0, 21.0, 1501.0],
                vec![12.0, 22.0, 1502.25],
            ]
        );
    }

    #[test]
    fn reads_selected_columns_of_full_layout() {
        let input = "INLINE : 10 XLINE : 20 605000.5 7000100.25 1500.5 extra\n";
        let mut rdr = reader_builder().from_reader(input.as_bytes());
        let t = read_table_from_reader(
            &mut rdr,
            ColumnSpec::Full,
            &[Column::CdpX, Column::CdpY, Column::Depth],
        )
        .unwrap();
        assert_eq!(t.schema, vec![Column::CdpX, Column::CdpY, Column::Depth]);
        assert_eq!(t.rows, vec![vec![605000.5, 7000100.25, 1500.5]]);
    }

    #[test]
    fn parse_error_reports_line_and_column() {
        let input = "10 20 1500.5\n11 abc 1501\n";
        let mut rdr = reader_builder().from_reader(input.as_bytes());
        let err = read_table_from_reader(&mut rdr, ColumnSpec::Reduced, &REDUCED).unwrap_err();
        match err {
            CharismaError::Parse { row, column, raw, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "CROSSLINE_3D");
                assert_eq!(raw, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_row_is_a_parse_error() {
        let input = "10 20\n";
        let mut rdr = reader_builder().from_reader(input.as_bytes());
        let err = read_table_from_reader(&mut rdr, ColumnSpec::Reduced, &REDUCED).unwrap_err();
        assert!(err.to_string().contains("expected at least 3 fields"));
    }

    #[test]
    fn column_outside_layout_is_rejected() {
        let mut rdr = reader_builder().from_reader("1 2 3\n".as_bytes());
        let err =
            read_table_from_reader(&mut rdr, ColumnSpec::Reduced, &[Column::CdpX]).unwrap_err();
        assert!(matches!(err, CharismaError::Format { .. }));
    }

    #[test]
    fn writes_space_separated_rows_without_header() {
        let mut wtr = super::writer_builder().from_writer(Vec::new());
        write_reduced_to_writer(&mut wtr, &[(1, 2, 100.0), (1, 3, 100.5)]).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(out, "1 2 100.0\n1 3 100.5\n");
    }

    #[test]
    fn depth_formatting_keeps_a_decimal_point() {
        assert_eq!(format_depth(100.0), "100.0");
        assert_eq!(format_depth(-2.5), "-2.5");
        assert_eq!(format_depth(f32::NAN), "NaN");
    }
}
