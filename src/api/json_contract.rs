use serde::{Deserialize, Serialize};

use crate::core::IncidenceTable;
use crate::error::{IncidenceError, IncidenceResult};
use crate::render::ChartSpec;

pub const CHART_SPEC_JSON_SCHEMA_V1: u32 = 1;
pub const INCIDENCE_TABLE_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpecJsonContractV1 {
    pub schema_version: u32,
    pub chart: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidenceTableJsonContractV1 {
    pub schema_version: u32,
    pub table: IncidenceTable,
}

impl ChartSpec {
    pub fn to_json_contract_v1_pretty(&self) -> IncidenceResult<String> {
        let payload = ChartSpecJsonContractV1 {
            schema_version: CHART_SPEC_JSON_SCHEMA_V1,
            chart: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            IncidenceError::InvalidData(format!("failed to serialize chart contract v1: {e}"))
        })
    }

    /// Accepts either a bare chart or a versioned v1 envelope.
    pub fn from_json_compat_str(input: &str) -> IncidenceResult<Self> {
        let chart = match serde_json::from_str::<ChartSpec>(input) {
            Ok(chart) => chart,
            Err(_) => {
                let payload: ChartSpecJsonContractV1 =
                    serde_json::from_str(input).map_err(|e| {
                        IncidenceError::InvalidData(format!(
                            "failed to parse chart json payload: {e}"
                        ))
                    })?;
                if payload.schema_version != CHART_SPEC_JSON_SCHEMA_V1 {
                    return Err(IncidenceError::InvalidData(format!(
                        "unsupported chart schema version: {}",
                        payload.schema_version
                    )));
                }
                payload.chart
            }
        };
        chart.validate()?;
        Ok(chart)
    }
}

impl IncidenceTable {
    pub fn to_json_contract_v1_pretty(&self) -> IncidenceResult<String> {
        let payload = IncidenceTableJsonContractV1 {
            schema_version: INCIDENCE_TABLE_JSON_SCHEMA_V1,
            table: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            IncidenceError::InvalidData(format!("failed to serialize incidence contract v1: {e}"))
        })
    }

    /// Accepts either a bare table or a versioned v1 envelope; either way the
    /// table must pass `IncidenceTable::validate`.
    pub fn from_json_compat_str(input: &str) -> IncidenceResult<Self> {
        let table = match serde_json::from_str::<IncidenceTable>(input) {
            Ok(table) => table,
            Err(_) => {
                let payload: IncidenceTableJsonContractV1 =
                    serde_json::from_str(input).map_err(|e| {
                        IncidenceError::InvalidData(format!(
                            "failed to parse incidence json payload: {e}"
                        ))
                    })?;
                if payload.schema_version != INCIDENCE_TABLE_JSON_SCHEMA_V1 {
                    return Err(IncidenceError::InvalidData(format!(
                        "unsupported incidence schema version: {}",
                        payload.schema_version
                    )));
                }
                payload.table
            }
        };
        table.validate()?;
        Ok(table)
    }
}
