// Vacancy collection: sources of raw search results and the in-memory
// list of normalized records built from them.

pub mod headhunter;
pub mod runner;

use std::io::{self, Write};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::models::vacancy::Vacancy;

/// Trait that all vacancy sources must implement.
/// A source answers one search per company with the raw JSON document,
/// undecoded beyond `serde_json::Value`.
#[async_trait]
pub trait VacancySource: Send + Sync {
    /// Human-readable source name, used in logs.
    fn name(&self) -> &str;

    /// Fetch the search results for vacancies published by `company`.
    async fn fetch(&self, company: &str) -> Result<Value, AppError>;
}

/// Outcome of collecting one company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub fetched: usize,
    pub added: usize,
    pub skipped: usize,
}

/// Ordered, in-memory list of normalized vacancies awaiting persistence.
#[derive(Debug, Default)]
pub struct Collector {
    vacancies: Vec<Vacancy>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch one company from `source` and append every well-formed item.
    /// Items that fail to normalize are dropped.
    pub async fn add_vacancies(
        &mut self,
        source: &dyn VacancySource,
        company: &str,
    ) -> Result<CollectStats, AppError> {
        let data = source.fetch(company).await?;
        let items = headhunter::items(&data)?;

        let mut stats = CollectStats {
            fetched: items.len(),
            ..Default::default()
        };
        for raw in items {
            match headhunter::normalize(raw) {
                Ok(vacancy) => {
                    self.vacancies.push(vacancy);
                    stats.added += 1;
                }
                Err(e) => {
                    let id = raw.get("id").unwrap_or(&Value::Null);
                    tracing::debug!("Skipping {} item {id}: {e}", source.name());
                    stats.skipped += 1;
                }
            }
        }

        tracing::info!(
            "'{company}': {} fetched, {} added, {} skipped",
            stats.fetched,
            stats.added,
            stats.skipped
        );
        Ok(stats)
    }

    /// Remove the first record equal to `vacancy`.
    /// Prints `Vacancy does not exist` to stdout when there is none.
    pub fn remove(&mut self, vacancy: &Vacancy) -> Option<Vacancy> {
        self.remove_reporting_to(vacancy, &mut io::stdout().lock())
    }

    fn remove_reporting_to(
        &mut self,
        vacancy: &Vacancy,
        out: &mut impl Write,
    ) -> Option<Vacancy> {
        match self.vacancies.iter().position(|v| v == vacancy) {
            Some(index) => Some(self.vacancies.remove(index)),
            None => {
                let _ = writeln!(out, "Vacancy does not exist");
                None
            }
        }
    }

    pub fn vacancies(&self) -> &[Vacancy] {
        &self.vacancies
    }

    pub fn len(&self) -> usize {
        self.vacancies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vacancies.is_empty()
    }
}
