use crate::extension::next_chunk;
use crate::extension::read_source;
use crate::extension::ExtensionError;
use crate::extension::FileParam;
use crate::extension::NamedParam;
use crate::extension::Param;
use crate::extension::SheetNameParam;
use crate::extension::TableNameParam;
use crate::query::QueryEngine;
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

/// Parameters for the sheet_table_rows table function
struct SheetTableRowsParameters {
    source: SheetSource,
    table_name: String,
}

impl TryFrom<&BindInfo> for SheetTableRowsParameters {
    type Error = ExtensionError;

    fn try_from(bind: &BindInfo) -> Result<Self, Self::Error> {
        Ok(SheetTableRowsParameters {
            source: read_source(bind)?,
            table_name: TableNameParam::read(bind, 1)?,
        })
    }
}

#[repr(C)]
/// Row labels of one table
pub(crate) struct SheetTableRowsBindData {
    table_name: String,
    row_names: Vec<String>,
}

impl TryFrom<&SheetTableRowsParameters> for SheetTableRowsBindData {
    type Error = ExtensionError;

    fn try_from(parameters: &SheetTableRowsParameters) -> Result<Self, Self::Error> {
        let labels = QueryEngine::new(parameters.source.clone()).table_row_labels(&parameters.table_name)?;
        Ok(SheetTableRowsBindData {
            table_name: labels.table_name,
            row_names: labels.row_names,
        })
    }
}

#[repr(C)]
/// Output cursor of the sheet_table_rows table function
pub(crate) struct SheetTableRowsInitData {
    index: AtomicUsize,
}

/// `sheet_table_rows(file, table_name [, sheet_name := ...])`: one row per row label.
pub(crate) struct SheetTableRowsTableFunction;

impl VTab for SheetTableRowsTableFunction {
    type InitData = SheetTableRowsInitData;
    type BindData = SheetTableRowsBindData;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let parameters = SheetTableRowsParameters::try_from(bind)?;
        let data = SheetTableRowsBindData::try_from(&parameters)?;
        bind.add_result_column("table_name", LogicalTypeHandle::from(LogicalTypeId::Varchar));
        bind.add_result_column("row_name", LogicalTypeHandle::from(LogicalTypeId::Varchar));
        Ok(data)
    }

    fn init(_: &InitInfo) -> Result<Self::InitData, Box<dyn Error>> {
        Ok(SheetTableRowsInitData {
            index: AtomicUsize::new(0),
        })
    }

    fn func(func: &TableFunctionInfo<Self>, output: &mut DataChunkHandle) -> Result<(), Box<dyn Error>> {
        let init = func.get_init_data();
        let bind = func.get_bind_data();
        match next_chunk(&init.index, bind.row_names.len()) {
            Some(chunk) => {
                let tables = output.flat_vector(0);
                let rows = output.flat_vector(1);
                for index in chunk.clone() {
                    tables.insert(index - chunk.start, bind.table_name.as_str());
                    rows.insert(index - chunk.start, bind.row_names[index].as_str());
                }
                output.set_len(chunk.len());
            }
            None => output.set_len(0),
        }
        Ok(())
    }

    fn parameters() -> Option<Vec<LogicalTypeHandle>> {
        Some(vec![FileParam::kind(), TableNameParam::kind()])
    }

    fn named_parameters() -> Option<Vec<(String, LogicalTypeHandle)>> {
        Some(vec![SheetNameParam::definition()])
    }
}
