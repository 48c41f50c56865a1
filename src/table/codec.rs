use crate::sheets::{CellValue, Grid};

use super::types::*;

/// Converts between the untyped cell grid of the values API and [`Table`].
pub trait TableCodec {
    fn decode(&self, grid: Grid, options: &ReadOptions) -> Result<Table, TableError>;

    /// Exactly `header_rows` header rows followed by every data row.
    fn encode(&self, table: &Table, header_rows: usize) -> Grid;

    /// A single data row, index labels first.
    fn encode_row(&self, table: &Table, n: usize) -> Option<Vec<CellValue>> {
        table.row(n).map(Row::into_cells)
    }
}

/// Default codec.
///
/// Ragged rows are padded with empty cells, blank strings read as empty cells
/// and values keep the type the service rendered them with.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridCodec;

impl TableCodec for GridCodec {
    fn decode(&self, grid: Grid, options: &ReadOptions) -> Result<Table, TableError> {
        if grid.iter().all(|row| row.is_empty()) {
            return Ok(Table::default());
        }

        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        if grid.len() < options.header_rows {
            return Err(TableError::MissingHeaderRows {
                expected: options.header_rows,
                found: grid.len(),
            });
        }
        if width < options.index_cols {
            return Err(TableError::MissingIndexColumns {
                expected: options.index_cols,
                found: width,
            });
        }

        let mut rows = grid.into_iter();
        let headers: Vec<Vec<CellValue>> = rows.by_ref().take(options.header_rows).collect();

        let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); width];
        for row in rows {
            let mut cells = row.into_iter();
            for column in values.iter_mut() {
                column.push(normalize(cells.next().unwrap_or_default()));
            }
        }

        let mut columns: Vec<Column> = values
            .into_iter()
            .enumerate()
            .map(|(col_idx, values)| {
                let labels = headers
                    .iter()
                    .map(|header| header.get(col_idx).map(CellValue::to_label).unwrap_or_default())
                    .skip_while(String::is_empty)
                    .collect();
                Column::with_labels(labels, values)
            })
            .collect();

        let data = columns.split_off(options.index_cols);
        Table::new(data)?.with_index(columns)
    }

    fn encode(&self, table: &Table, header_rows: usize) -> Grid {
        let all: Vec<&Column> = table.index().iter().chain(table.columns()).collect();

        // Unlabelled data columns are headed by their position, unlabelled index levels stay blank
        let names = table.column_names();
        let stacks: Vec<Vec<&str>> = table
            .index()
            .iter()
            .map(|column| column.labels().iter().map(String::as_str).collect())
            .chain(table.columns().iter().zip(&names).map(|(column, name)| {
                if column.labels().is_empty() {
                    vec![name.as_str()]
                } else {
                    column.labels().iter().map(String::as_str).collect()
                }
            }))
            .collect();

        let mut grid = Vec::with_capacity(header_rows + table.len());

        // Stacks keep their innermost labels and are padded on top, so names share the last header row
        for level in 0..header_rows {
            let row = stacks
                .iter()
                .map(|labels| {
                    let pad = header_rows.saturating_sub(labels.len());
                    let skip = labels.len().saturating_sub(header_rows);
                    match level.checked_sub(pad).and_then(|i| labels.get(skip + i)) {
                        Some(label) if !label.is_empty() => CellValue::String(label.to_string()),
                        _ => CellValue::Empty,
                    }
                })
                .collect();
            grid.push(row);
        }

        for n in 0..table.len() {
            let row = all
                .iter()
                .map(|column| column.get(n).cloned().unwrap_or_default())
                .collect();
            grid.push(row);
        }

        grid
    }
}

fn normalize(value: CellValue) -> CellValue {
    match value {
        CellValue::String(s) if s.is_empty() => CellValue::Empty,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    fn header(n: usize) -> ReadOptions {
        ReadOptions {
            header_rows: n,
            index_cols: 0,
        }
    }

    #[test]
    fn test_decode_with_header() {
        let grid = vec![
            row(&["foo", "bar"]),
            row(&["1", "baz"]),
            row(&["2", "qux"]),
            row(&["3", "quux"]),
            row(&["4", "quuz"]),
        ];
        let table = GridCodec.decode(grid, &header(1)).unwrap();

        let expected = Table::from_rows(
            &["foo", "bar"],
            vec![
                row(&["1", "baz"]),
                row(&["2", "qux"]),
                row(&["3", "quux"]),
                row(&["4", "quuz"]),
            ],
        )
        .unwrap();
        assert_eq!(table, expected);
        assert_eq!(table.len(), 4);
        assert_eq!(table.column_names(), vec!["foo", "bar"]);
        assert_eq!(table.col_at(0).unwrap().dtype(), DataType::String);
    }

    #[test]
    fn test_decode_without_header() {
        let grid = vec![row(&["1", "a"]), row(&["2", "b"])];
        let table = GridCodec.decode(grid, &header(0)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names(), vec!["0", "1"]);
        assert!(table.col_at(1).unwrap().labels().is_empty());
    }

    #[test]
    fn test_decode_pads_ragged_rows() {
        let grid = vec![
            row(&["foo", "bar", "baz"]),
            vec![CellValue::Number(1.0)],
            vec![CellValue::Number(2.0), CellValue::from(""), CellValue::Bool(true)],
        ];
        let table = GridCodec.decode(grid, &header(1)).unwrap();
        let baz = table.column("baz").unwrap();
        assert_eq!(baz.values(), &[CellValue::Empty, CellValue::Bool(true)]);
        assert_eq!(baz.dtype(), DataType::Bool);
        assert_eq!(table.column("bar").unwrap().dtype(), DataType::Empty);
        assert_eq!(table.column("foo").unwrap().dtype(), DataType::Number);
    }

    #[test]
    fn test_decode_index_columns() {
        let grid = vec![
            row(&["id", "value"]),
            row(&["a", "1"]),
            row(&["b", "2"]),
        ];
        let options = ReadOptions {
            header_rows: 1,
            index_cols: 1,
        };
        let table = GridCodec.decode(grid, &options).unwrap();
        assert_eq!(table.width(), 1);
        assert_eq!(table.index().len(), 1);
        assert_eq!(table.index()[0].name(), Some("id"));
        assert_eq!(table.row(1).unwrap().labels, row(&["b"]));
    }

    #[test]
    fn test_decode_multi_level_header() {
        let grid = vec![
            row(&["2023", "", "2024"]),
            row(&["q1", "q2", "q1"]),
            vec![CellValue::Number(1.0), CellValue::Number(2.0), CellValue::Number(3.0)],
        ];
        let table = GridCodec.decode(grid, &header(2)).unwrap();
        assert_eq!(table.col_at(0).unwrap().labels(), &["2023".to_string(), "q1".to_string()]);
        assert_eq!(table.col_at(1).unwrap().labels(), &["q2".to_string()]);
    }

    #[test]
    fn test_decode_empty_grid() {
        let table = GridCodec.decode(Vec::new(), &header(1)).unwrap();
        assert_eq!(table, Table::default());
    }

    #[test]
    fn test_decode_header_only() {
        let table = GridCodec.decode(vec![row(&["foo", "bar"])], &header(1)).unwrap();
        assert_eq!(table.len(), 0);
        assert_eq!(table.column_names(), vec!["foo", "bar"]);
    }

    #[test]
    fn test_decode_missing_header_rows() {
        let err = GridCodec.decode(vec![row(&["foo"])], &header(2)).unwrap_err();
        assert_eq!(err, TableError::MissingHeaderRows { expected: 2, found: 1 });
    }

    #[test]
    fn test_decode_missing_index_columns() {
        let options = ReadOptions {
            header_rows: 0,
            index_cols: 3,
        };
        let err = GridCodec.decode(vec![row(&["a", "b"])], &options).unwrap_err();
        assert_eq!(err, TableError::MissingIndexColumns { expected: 3, found: 2 });
    }

    #[test]
    fn test_encode_with_index_and_header() {
        let table = Table::from_rows(&["value"], vec![row(&["1"]), row(&["2"])])
            .unwrap()
            .with_index(vec![Column::new("id", row(&["a", "b"]))])
            .unwrap();
        assert_eq!(
            GridCodec.encode(&table, 1),
            vec![row(&["id", "value"]), row(&["a", "1"]), row(&["b", "2"])]
        );
    }

    #[test]
    fn test_encode_without_header_rows() {
        let table = Table::from_rows(&["foo", "bar"], vec![row(&["1", "baz"]), row(&["2", "qux"])]).unwrap();
        assert_eq!(GridCodec.encode(&table, 0), vec![row(&["1", "baz"]), row(&["2", "qux"])]);
    }

    #[test]
    fn test_encode_unnamed_columns_use_positions() {
        let table = Table::new(vec![
            Column::unnamed(row(&["1", "2"])),
            Column::unnamed(row(&["baz", "qux"])),
        ])
        .unwrap()
        .with_index(vec![Column::unnamed(row(&["a", "b"]))])
        .unwrap();
        assert_eq!(
            GridCodec.encode(&table, 1),
            vec![
                vec![CellValue::Empty, CellValue::from("0"), CellValue::from("1")],
                row(&["a", "1", "baz"]),
                row(&["b", "2", "qux"]),
            ]
        );
    }

    #[test]
    fn test_encode_unnamed_table_keeps_every_row() {
        let table = Table::new(vec![
            Column::unnamed(row(&["1", "2", "3", "4"])),
            Column::unnamed(row(&["a", "b", "c", "d"])),
        ])
        .unwrap();

        let decoded = GridCodec.decode(GridCodec.encode(&table, 1), &header(1)).unwrap();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded.column_names(), vec!["0", "1"]);
        assert_eq!(decoded.col_at(0).unwrap().values(), table.col_at(0).unwrap().values());
        assert_eq!(decoded.col_at(1).unwrap().values(), table.col_at(1).unwrap().values());
    }

    #[test]
    fn test_encode_pads_shallow_labels() {
        let table = Table::new(vec![
            Column::with_labels(vec!["2023".to_string(), "q1".to_string()], row(&["1"])),
            Column::new("total", row(&["9"])),
        ])
        .unwrap();
        assert_eq!(
            GridCodec.encode(&table, 2),
            vec![
                vec![CellValue::from("2023"), CellValue::Empty],
                row(&["q1", "total"]),
                row(&["1", "9"]),
            ]
        );
    }

    #[test]
    fn test_encode_keeps_innermost_labels() {
        let table = Table::new(vec![
            Column::with_labels(vec!["2023".to_string(), "q1".to_string()], row(&["1"])),
            Column::new("total", row(&["9"])),
        ])
        .unwrap();
        assert_eq!(GridCodec.encode(&table, 1), vec![row(&["q1", "total"]), row(&["1", "9"])]);
    }

    #[test]
    fn test_encode_decode_preserves_table() {
        let table = Table::from_rows(
            &["name", "score"],
            vec![
                vec!["ann".into(), 3.5.into()],
                vec!["bob".into(), CellValue::Empty],
            ],
        )
        .unwrap()
        .with_index(vec![Column::new("id", vec![1i64.into(), 2i64.into()])])
        .unwrap();

        let options = ReadOptions {
            header_rows: 1,
            index_cols: 1,
        };
        let decoded = GridCodec.decode(GridCodec.encode(&table, 1), &options).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_encode_row_last() {
        let table = Table::from_rows(&["foo", "bar"], vec![row(&["1", "bar"]), row(&["2", "baz"])]).unwrap();
        assert_eq!(GridCodec.encode_row(&table, 1), Some(row(&["2", "baz"])));
        assert_eq!(GridCodec.encode_row(&table, 2), None);
    }
}
