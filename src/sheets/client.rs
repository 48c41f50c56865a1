use std::future::Future;

use super::types::*;

/// The subset of the Sheets values API the range adapter depends on.
///
/// Every method is a single request/response round trip. Implementations must
/// not retry on their own; failures are reported to the caller as they happen.
pub trait SheetsService {
    /// `spreadsheets.values.batchGet`
    fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[&str],
        major_dimension: MajorDimension,
        render: ValueRenderOption,
    ) -> impl Future<Output = Result<BatchGetValuesResponse, ServiceError>> + Send;

    /// `spreadsheets.values.clear`
    fn clear(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> impl Future<Output = Result<ClearValuesResponse, ServiceError>> + Send;

    /// `spreadsheets.values.update`
    fn update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> impl Future<Output = Result<UpdateValuesResponse, ServiceError>> + Send;

    /// `spreadsheets.values.append`
    fn append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> impl Future<Output = Result<AppendValuesResponse, ServiceError>> + Send;
}

impl<T: SheetsService + Sync> SheetsService for &T {
    fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[&str],
        major_dimension: MajorDimension,
        render: ValueRenderOption,
    ) -> impl Future<Output = Result<BatchGetValuesResponse, ServiceError>> + Send {
        (**self).batch_get(spreadsheet_id, ranges, major_dimension, render)
    }

    fn clear(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> impl Future<Output = Result<ClearValuesResponse, ServiceError>> + Send {
        (**self).clear(spreadsheet_id, range)
    }

    fn update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> impl Future<Output = Result<UpdateValuesResponse, ServiceError>> + Send {
        (**self).update(spreadsheet_id, range, values, input)
    }

    fn append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> impl Future<Output = Result<AppendValuesResponse, ServiceError>> + Send {
        (**self).append(spreadsheet_id, range, values, input)
    }
}
