use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::client::SheetsService;
use super::types::*;
use crate::range::A1Range;

/// A call received by [`MemorySheets`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    BatchGet {
        ranges: Vec<String>,
        major_dimension: MajorDimension,
        render: ValueRenderOption,
    },
    Clear {
        range: String,
    },
    Update {
        range: String,
        values: Grid,
        input: ValueInputOption,
    },
    Append {
        range: String,
        values: Grid,
        input: ValueInputOption,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    BatchGet,
    Clear,
    Update,
    Append,
}

#[derive(Debug, Default)]
struct State {
    /// Sheets in creation order; ranges without a sheet name address the first one
    sheets: Vec<(String, Grid)>,
    calls: Vec<RecordedCall>,
    failures: HashSet<CallKind>,
}

/// In-process spreadsheet that answers `SheetsService` calls the way the
/// remote service does for plain values: unknown sheets are rejected, reads
/// drop trailing blank cells and appends land after the last non-blank row.
#[derive(Debug, Default)]
pub struct MemorySheets {
    spreadsheet_id: String,
    state: Mutex<State>,
}

impl MemorySheets {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_sheet(self, name: impl Into<String>, values: Grid) -> Self {
        self.add_sheet(name, values);
        self
    }

    pub fn add_sheet(&self, name: impl Into<String>, values: Grid) {
        let name = name.into();
        let mut state = self.lock();
        match state.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, grid)) => *grid = values,
            None => state.sheets.push((name, values)),
        }
    }

    /// Current contents of a sheet, trailing blanks removed
    pub fn sheet(&self, name: &str) -> Option<Grid> {
        self.lock()
            .sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, grid)| trim(grid.clone()))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Make every subsequent call of `kind` fail with a server error
    pub fn fail(&self, kind: CallKind) {
        self.lock().failures.insert(kind);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep serving it
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, spreadsheet_id: &str, kind: CallKind, call: RecordedCall) -> Result<MutexGuard<'_, State>, ServiceError> {
        let mut state = self.lock();
        state.calls.push(call);
        if spreadsheet_id != self.spreadsheet_id {
            return Err(ServiceError::api(404, "Requested entity was not found."));
        }
        if state.failures.contains(&kind) {
            return Err(ServiceError::api(500, "Internal error encountered."));
        }
        Ok(state)
    }

    fn read(
        &self,
        spreadsheet_id: &str,
        ranges: &[&str],
        major_dimension: MajorDimension,
        render: ValueRenderOption,
    ) -> Result<BatchGetValuesResponse, ServiceError> {
        let call = RecordedCall::BatchGet {
            ranges: ranges.iter().map(|r| r.to_string()).collect(),
            major_dimension,
            render,
        };
        let mut state = self.begin(spreadsheet_id, CallKind::BatchGet, call)?;

        let mut value_ranges = Vec::with_capacity(ranges.len());
        for range in ranges {
            let (target, grid) = resolve(&mut state, range)?;
            let window = Window::of(&target);
            let values = grid
                .iter()
                .enumerate()
                .filter(|(r, _)| window.has_row(*r))
                .map(|(_, row)| {
                    row.iter()
                        .enumerate()
                        .filter(|(c, _)| window.has_col(*c))
                        .map(|(_, cell)| cell.clone())
                        .collect()
                })
                .collect();
            value_ranges.push(ValueRange {
                range: Some(range.to_string()),
                major_dimension: MajorDimension::Rows,
                values: trim(values),
            });
        }

        Ok(BatchGetValuesResponse {
            spreadsheet_id: self.spreadsheet_id.clone(),
            value_ranges,
        })
    }

    fn erase(&self, spreadsheet_id: &str, range: &str) -> Result<ClearValuesResponse, ServiceError> {
        let call = RecordedCall::Clear {
            range: range.to_string(),
        };
        let mut state = self.begin(spreadsheet_id, CallKind::Clear, call)?;
        let (target, grid) = resolve(&mut state, range)?;
        let window = Window::of(&target);

        for (r, row) in grid.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                if window.has_row(r) && window.has_col(c) {
                    *cell = CellValue::Empty;
                }
            }
        }

        Ok(ClearValuesResponse {
            spreadsheet_id: self.spreadsheet_id.clone(),
            cleared_range: Some(range.to_string()),
        })
    }

    fn write(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse, ServiceError> {
        let call = RecordedCall::Update {
            range: range.to_string(),
            values: values.values.clone(),
            input,
        };
        let mut state = self.begin(spreadsheet_id, CallKind::Update, call)?;
        let (target, grid) = resolve(&mut state, range)?;
        let (row, col) = target.origin();

        Ok(UpdateValuesResponse {
            spreadsheet_id: self.spreadsheet_id.clone(),
            updated_range: Some(range.to_string()),
            ..place(grid, row as usize, col as usize, &values.values)
        })
    }

    fn push(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<AppendValuesResponse, ServiceError> {
        let call = RecordedCall::Append {
            range: range.to_string(),
            values: values.values.clone(),
            input,
        };
        let mut state = self.begin(spreadsheet_id, CallKind::Append, call)?;
        let (target, grid) = resolve(&mut state, range)?;
        let (origin_row, col) = target.origin();

        let next_row = grid
            .iter()
            .rposition(|row| row.iter().any(|cell| !cell.is_empty()))
            .map(|last| last + 1)
            .unwrap_or(0)
            .max(origin_row as usize);

        let updates = place(grid, next_row, col as usize, &values.values);
        Ok(AppendValuesResponse {
            spreadsheet_id: self.spreadsheet_id.clone(),
            table_range: Some(range.to_string()),
            updates: Some(UpdateValuesResponse {
                spreadsheet_id: self.spreadsheet_id.clone(),
                ..updates
            }),
        })
    }
}

impl SheetsService for MemorySheets {
    async fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[&str],
        major_dimension: MajorDimension,
        render: ValueRenderOption,
    ) -> Result<BatchGetValuesResponse, ServiceError> {
        self.read(spreadsheet_id, ranges, major_dimension, render)
    }

    async fn clear(&self, spreadsheet_id: &str, range: &str) -> Result<ClearValuesResponse, ServiceError> {
        self.erase(spreadsheet_id, range)
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse, ServiceError> {
        self.write(spreadsheet_id, range, values, input)
    }

    async fn append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<AppendValuesResponse, ServiceError> {
        self.push(spreadsheet_id, range, values, input)
    }
}

fn resolve<'a>(state: &'a mut State, range: &str) -> Result<(A1Range, &'a mut Grid), ServiceError> {
    let unparsable = || ServiceError::api(400, format!("Unable to parse range: {}", range));
    let target = A1Range::parse(range).map_err(|_| unparsable())?;

    let entry = match &target.sheet {
        Some(name) => state.sheets.iter_mut().find(|(n, _)| n == name),
        None => state.sheets.first_mut(),
    };
    match entry {
        Some((_, grid)) => Ok((target, grid)),
        None => Err(unparsable()),
    }
}

/// Inclusive row/column bounds of a range, open ends unbounded
struct Window {
    rows: (usize, usize),
    cols: (usize, usize),
}

impl Window {
    fn of(range: &A1Range) -> Self {
        let Some(rect) = &range.cells else {
            return Window {
                rows: (0, usize::MAX),
                cols: (0, usize::MAX),
            };
        };
        let end = rect.end.unwrap_or(rect.start);
        let bound = |start: Option<u32>, end: Option<u32>| {
            let lo = start.map(|v| v as usize).unwrap_or(0);
            let hi = end.map(|v| v as usize).unwrap_or(usize::MAX);
            (lo.min(hi), lo.max(hi))
        };
        Window {
            rows: bound(rect.start.row, end.row),
            cols: bound(rect.start.col, end.col),
        }
    }

    fn has_row(&self, r: usize) -> bool {
        r >= self.rows.0 && r <= self.rows.1
    }

    fn has_col(&self, c: usize) -> bool {
        c >= self.cols.0 && c <= self.cols.1
    }
}

/// Write `values` with their top-left corner at (row, col), growing the grid as needed.
fn place(grid: &mut Grid, row: usize, col: usize, values: &Grid) -> UpdateValuesResponse {
    let mut cells = 0;
    for (i, source) in values.iter().enumerate() {
        let r = row + i;
        if grid.len() <= r {
            grid.resize(r + 1, Vec::new());
        }
        let target = &mut grid[r];
        if target.len() < col + source.len() {
            target.resize(col + source.len(), CellValue::Empty);
        }
        for (j, value) in source.iter().enumerate() {
            target[col + j] = normalize(value.clone());
            cells += 1;
        }
    }

    UpdateValuesResponse {
        spreadsheet_id: String::new(),
        updated_range: None,
        updated_rows: values.len() as u32,
        updated_columns: values.iter().map(Vec::len).max().unwrap_or(0) as u32,
        updated_cells: cells,
    }
}

/// Blank strings are stored as empty cells, matching what the service returns.
fn normalize(value: CellValue) -> CellValue {
    if value.is_empty() {
        CellValue::Empty
    } else {
        value
    }
}

/// Drop trailing blank cells of each row and trailing blank rows.
fn trim(mut grid: Grid) -> Grid {
    for row in grid.iter_mut() {
        while row.last().is_some_and(CellValue::is_empty) {
            row.pop();
        }
    }
    while grid.last().is_some_and(Vec::is_empty) {
        grid.pop();
    }
    grid
}
