//! CSV ingestion of work-order, availability, and history records.
//!
//! Three feeds, matching the upstream export columns:
//!
//! - **availability**: one row per worker (`matricula`, slash-separated
//!   `qualificacao`, `hora_total` as an `HH:MM:SS` budget)
//! - **history**: one row per completed operation (`matricula`,
//!   `equipamento`); counted into per-asset experience
//! - **work orders**: one row per operation (`ordem`, `operacao`,
//!   `qualificacao`, `equipamento_ordem`, `esforco_individual` in
//!   fractional hours, `data_inicio_base`, `hora_inicio_base`,
//!   `indice_irpe`)
//!
//! A malformed field is fatal for its record only: the record is dropped,
//! the error is kept, and the load continues. Operation starts chain off
//! the previous operation of the same order as the rows arrive.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::error::{DayOverflow, FormatError};
use crate::models::{MaintenanceTask, Operation, Worker};
use crate::time::{parse_date, parse_effort_hours, parse_minute_budget, parse_time_of_day};

/// A worker availability row.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityRecord {
    /// Employee number.
    pub matricula: String,
    /// Slash-separated skill tokens; may be empty.
    #[serde(default)]
    pub qualificacao: Option<String>,
    /// Total available time as `HH:MM:SS`; may be empty.
    #[serde(default)]
    pub hora_total: Option<String>,
}

/// A maintenance history row.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecord {
    /// Employee number.
    pub matricula: String,
    /// Asset the employee worked on.
    pub equipamento: String,
}

/// A work-order operation row.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkOrderRecord {
    /// Work-order identifier.
    pub ordem: String,
    /// Operation identifier within the order.
    pub operacao: String,
    /// Slash-separated required skills; may be empty.
    #[serde(default)]
    pub qualificacao: Option<String>,
    /// Target asset.
    pub equipamento_ordem: String,
    /// Individual effort in fractional hours, comma-decimal tolerated.
    #[serde(default)]
    pub esforco_individual: Option<String>,
    /// Base start date, `DD/MM/YYYY`.
    pub data_inicio_base: String,
    /// Base start time of the order's first operation.
    #[serde(default)]
    pub hora_inicio_base: Option<String>,
    /// Priority index; higher is more urgent.
    #[serde(default)]
    pub indice_irpe: Option<f64>,
}

/// An ingestion failure.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A field of one record could not be parsed.
    #[error("record {index}: {source}")]
    Record {
        /// Zero-based record index within its file.
        index: usize,
        source: FormatError,
    },
    /// A chained operation start would cross midnight.
    #[error("record {index}: {source}")]
    Chain {
        /// Zero-based record index within its file.
        index: usize,
        source: DayOverflow,
    },
    /// The file could not be read or a row could not be decoded.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Partial load result: everything that parsed, plus what did not.
#[derive(Debug)]
pub struct Loaded<T> {
    /// Successfully converted records.
    pub records: Vec<T>,
    /// Per-record failures, in file order.
    pub errors: Vec<IngestError>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Loads the worker roster from the availability and history files.
pub fn load_workers(
    availability_path: &Path,
    history_path: &Path,
) -> Result<Loaded<Worker>, IngestError> {
    let (availability, mut errors) = read_records::<AvailabilityRecord>(availability_path)?;
    let (history, history_errors) = read_records::<HistoryRecord>(history_path)?;
    errors.extend(history_errors);

    let mut loaded = workers_from_records(&availability, &history);
    loaded.errors.extend(errors);
    for error in &loaded.errors {
        warn!(%error, "skipped availability record");
    }
    Ok(loaded)
}

/// Loads the work orders from the orders file.
pub fn load_tasks(orders_path: &Path) -> Result<Loaded<MaintenanceTask>, IngestError> {
    let (orders, errors) = read_records::<WorkOrderRecord>(orders_path)?;
    let mut loaded = tasks_from_records(&orders);
    loaded.errors.extend(errors);
    for error in &loaded.errors {
        warn!(%error, "skipped work-order record");
    }
    Ok(loaded)
}

/// Converts availability and history rows into workers.
///
/// Experience is the per-asset count of history rows for the employee.
/// Missing budgets and skill lists degrade to zero and empty, matching
/// the upstream feed's blanks; malformed budgets drop the record.
pub fn workers_from_records(
    availability: &[AvailabilityRecord],
    history: &[HistoryRecord],
) -> Loaded<Worker> {
    let mut experience: HashMap<&str, HashMap<String, u32>> = HashMap::new();
    for record in history {
        *experience
            .entry(record.matricula.as_str())
            .or_default()
            .entry(record.equipamento.clone())
            .or_insert(0) += 1;
    }

    let mut loaded = Loaded::default();
    for (index, record) in availability.iter().enumerate() {
        let budget = match non_blank(record.hora_total.as_deref()) {
            Some(raw) => match parse_minute_budget(raw) {
                Ok(minutes) => minutes,
                Err(source) => {
                    loaded.errors.push(IngestError::Record { index, source });
                    continue;
                }
            },
            None => 0,
        };
        let mut worker = Worker::new(&record.matricula)
            .with_skills(split_skills(record.qualificacao.as_deref()))
            .with_minute_budget(budget);
        if let Some(counts) = experience.get(record.matricula.as_str()) {
            worker.experience_with_assets = counts.clone();
        }
        loaded.records.push(worker);
    }
    loaded
}

/// Converts work-order rows into maintenance tasks.
///
/// Rows sharing an `ordem` value fold into one task, in arrival order;
/// the first row fixes the task's date, base start, and priority. Each
/// row becomes an operation chained behind the previous one.
pub fn tasks_from_records(orders: &[WorkOrderRecord]) -> Loaded<MaintenanceTask> {
    let mut loaded: Loaded<MaintenanceTask> = Loaded::default();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for (index, record) in orders.iter().enumerate() {
        let due_date = match parse_date(&record.data_inicio_base) {
            Ok(date) => date,
            Err(source) => {
                loaded.errors.push(IngestError::Record { index, source });
                continue;
            }
        };
        let effort_minutes = match non_blank(record.esforco_individual.as_deref()) {
            Some(raw) => match parse_effort_hours(raw) {
                Ok(minutes) => minutes,
                Err(source) => {
                    loaded.errors.push(IngestError::Record { index, source });
                    continue;
                }
            },
            None => 0,
        };

        let task_index = match index_by_id.get(&record.ordem) {
            Some(&existing) => existing,
            None => {
                let start_minute = match non_blank(record.hora_inicio_base.as_deref()) {
                    Some(raw) => match parse_time_of_day(raw) {
                        Ok(minute) => minute,
                        Err(source) => {
                            loaded.errors.push(IngestError::Record { index, source });
                            continue;
                        }
                    },
                    None => 0,
                };
                let task = MaintenanceTask::new(&record.ordem, due_date)
                    .with_start_minute(start_minute)
                    .with_priority(record.indice_irpe.unwrap_or(0.0));
                loaded.records.push(task);
                let created = loaded.records.len() - 1;
                index_by_id.insert(record.ordem.clone(), created);
                created
            }
        };

        let operation = Operation::new(&record.operacao, due_date)
            .with_required_skills(split_skills(record.qualificacao.as_deref()))
            .with_asset(&record.equipamento_ordem)
            .with_effort(effort_minutes);
        if let Err(source) = loaded.records[task_index].chain_operation(operation) {
            loaded.errors.push(IngestError::Chain { index, source });
        }
    }
    loaded
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, Vec<IngestError>), IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for result in reader.deserialize() {
        match result {
            Ok(record) => records.push(record),
            Err(error) => errors.push(IngestError::Csv(error)),
        }
    }
    Ok((records, errors))
}

fn split_skills(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split('/')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}
