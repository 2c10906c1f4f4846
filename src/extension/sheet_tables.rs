use crate::extension::next_chunk;
use crate::extension::read_source;
use crate::extension::ExtensionError;
use crate::extension::FileParam;
use crate::extension::NamedParam;
use crate::extension::Param;
use crate::extension::SheetNameParam;
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

/// Parameters for the sheet_tables table function
struct SheetTablesParameters {
    source: SheetSource,
}

impl TryFrom<&BindInfo> for SheetTablesParameters {
    type Error = ExtensionError;

    fn try_from(bind: &BindInfo) -> Result<Self, Self::Error> {
        Ok(SheetTablesParameters {
            source: read_source(bind)?,
        })
    }
}

#[repr(C)]
/// Names of the tables found in the sheet
pub(crate) struct SheetTablesBindData {
    tables: Vec<String>,
}

impl TryFrom<&SheetTablesParameters> for SheetTablesBindData {
    type Error = ExtensionError;

    fn try_from(parameters: &SheetTablesParameters) -> Result<Self, Self::Error> {
        let list = QueryEngine::new(parameters.source.clone()).list_tables()?;
        Ok(SheetTablesBindData { tables: list.tables })
    }
}

#[repr(C)]
/// Output cursor of the sheet_tables table function
pub(crate) struct SheetTablesInitData {
    index: AtomicUsize,
}

/// `sheet_tables(file [, sheet_name := ...])`: one row per table.
pub(crate) struct SheetTablesTableFunction;

impl VTab for SheetTablesTableFunction {
    type InitData = SheetTablesInitData;
    type BindData = SheetTablesBindData;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let parameters = SheetTablesParameters::try_from(bind)?;
        let data = SheetTablesBindData::try_from(&parameters)?;
        bind.add_result_column("table_name", LogicalTypeHandle::from(LogicalTypeId::Varchar));
        Ok(data)
    }

    fn init(_: &InitInfo) -> Result<Self::InitData, Box<dyn Error>> {
        Ok(SheetTablesInitData {
            index: AtomicUsize::new(0),
        })
    }

    fn func(func: &TableFunctionInfo<Self>, output: &mut DataChunkHandle) -> Result<(), Box<dyn Error>> {
        let init = func.get_init_data();
        let bind = func.get_bind_data();
        match next_chunk(&init.index, bind.tables.len()) {
            Some(chunk) => {
                let names = output.flat_vector(0);
                for index in chunk.clone() {
                    names.insert(index - chunk.start, bind.tables[index].as_str());
                }
                output.set_len(chunk.len());
            }
            None => output.set_len(0),
        }
        Ok(())
    }

    fn parameters() -> Option<Vec<LogicalTypeHandle>> {
        Some(vec![FileParam::kind()])
    }

    fn named_parameters() -> Option<Vec<(String, LogicalTypeHandle)>> {
        Some(vec![SheetNameParam::definition()])
    }
}
