use crate::extension::next_chunk;
use crate::extension::read_source;
use crate::extension::write_primitive;
use crate::extension::ExtensionError;
use crate::extension::FileParam;
use crate::extension::NamedParam;
use crate::extension::Param;
use crate::extension::RowNameParam;
use crate::extension::SheetNameParam;
use crate::extension::TableNameParam;
use crate::query::QueryEngine;
use crate::query::RowSum;
use crate::spreadsheet::SheetSource;
use duckdb::core::DataChunkHandle;
use duckdb::core::Inserter;
use duckdb::core::LogicalTypeHandle;
use duckdb::core::LogicalTypeId;
use duckdb::vtab::BindInfo;
use duckdb::vtab::InitInfo;
use duckdb::vtab::TableFunctionInfo;
use duckdb::vtab::VTab;
use std::error::Error;
use std::sync::atomic::AtomicUsize;

/// Parameters for the sheet_row_sum table function
struct SheetRowSumParameters {
    source: SheetSource,
    table_name: String,
    row_name: String,
}

impl TryFrom<&BindInfo> for SheetRowSumParameters {
    type Error = ExtensionError;

    fn try_from(bind: &BindInfo) -> Result<Self, Self::Error> {
        Ok(SheetRowSumParameters {
            source: read_source(bind)?,
            table_name: TableNameParam::read(bind, 1)?,
            row_name: RowNameParam::read(bind, 2)?,
        })
    }
}

#[repr(C)]
/// Sum of one table row
pub(crate) struct SheetRowSumBindData {
    sum: RowSum,
}

impl TryFrom<&SheetRowSumParameters> for SheetRowSumBindData {
    type Error = ExtensionError;

    fn try_from(parameters: &SheetRowSumParameters) -> Result<Self, Self::Error> {
        let sum = QueryEngine::new(parameters.source.clone()).row_sum(&parameters.table_name, &parameters.row_name)?;
        Ok(SheetRowSumBindData { sum })
    }
}

#[repr(C)]
/// Output cursor of the sheet_row_sum table function
pub(crate) struct SheetRowSumInitData {
    index: AtomicUsize,
}

/// `sheet_row_sum(file, table_name, row_name [, sheet_name := ...])`: a single row.
pub(crate) struct SheetRowSumTableFunction;

impl VTab for SheetRowSumTableFunction {
    type InitData = SheetRowSumInitData;
    type BindData = SheetRowSumBindData;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let parameters = SheetRowSumParameters::try_from(bind)?;
        let data = SheetRowSumBindData::try_from(&parameters)?;
        bind.add_result_column("table_name", LogicalTypeHandle::from(LogicalTypeId::Varchar));
        bind.add_result_column("row_name", LogicalTypeHandle::from(LogicalTypeId::Varchar));
        bind.add_result_column("sum", LogicalTypeHandle::from(LogicalTypeId::Double));
        Ok(data)
    }

    fn init(_: &InitInfo) -> Result<Self::InitData, Box<dyn Error>> {
        Ok(SheetRowSumInitData {
            index: AtomicUsize::new(0),
        })
    }

    fn func(func: &TableFunctionInfo<Self>, output: &mut DataChunkHandle) -> Result<(), Box<dyn Error>> {
        let init = func.get_init_data();
        let bind = func.get_bind_data();
        match next_chunk(&init.index, 1) {
            Some(_) => {
                output.flat_vector(0).insert(0, bind.sum.table_name.as_str());
                output.flat_vector(1).insert(0, bind.sum.row_name.as_str());
                write_primitive(&mut output.flat_vector(2), 0, bind.sum.sum);
                output.set_len(1);
            }
            None => output.set_len(0),
        }
        Ok(())
    }

    fn parameters() -> Option<Vec<LogicalTypeHandle>> {
        Some(vec![FileParam::kind(), TableNameParam::kind(), RowNameParam::kind()])
    }

    fn named_parameters() -> Option<Vec<(String, LogicalTypeHandle)>> {
        Some(vec![SheetNameParam::definition()])
    }
}
