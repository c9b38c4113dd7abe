use sqlx::{PgConnection, PgPool};

use crate::collectors::{CollectStats, Collector, VacancySource};
use crate::error::AppError;
use crate::models::vacancy::Vacancy;

/// Row counts written by one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub employers_new: usize,
    pub vacancies: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub collected: CollectStats,
    pub loaded: LoadStats,
}

/// Collect every company in turn, then load the whole list in one
/// transaction that commits only after the last row.
pub async fn run(
    pool: &PgPool,
    source: &dyn VacancySource,
    companies: &[String],
) -> Result<RunSummary, AppError> {
    let mut collector = Collector::new();
    let collected = collect_all(&mut collector, source, companies).await?;

    let mut tx = pool.begin().await?;
    let loaded = load_vacancies(&mut tx, collector.vacancies()).await?;
    tx.commit().await?;

    tracing::info!(
        "Run completed: {} vacancies loaded, {} new employers, {} items skipped",
        loaded.vacancies,
        loaded.employers_new,
        collected.skipped
    );
    Ok(RunSummary { collected, loaded })
}

pub async fn collect_all(
    collector: &mut Collector,
    source: &dyn VacancySource,
    companies: &[String],
) -> Result<CollectStats, AppError> {
    tracing::info!(
        "Collecting {} companies from {}",
        companies.len(),
        source.name()
    );

    let mut total = CollectStats::default();
    for company in companies {
        let stats = collector.add_vacancies(source, company).await?;
        total.fetched += stats.fetched;
        total.added += stats.added;
        total.skipped += stats.skipped;
    }
    Ok(total)
}

/// Write each vacancy and its employer. Employers already present are left
/// untouched. Nothing is committed here.
pub async fn load_vacancies(
    conn: &mut PgConnection,
    vacancies: &[Vacancy],
) -> Result<LoadStats, AppError> {
    let mut stats = LoadStats::default();

    for vacancy in vacancies {
        if vacancy.employer().insert_ignore(&mut *conn).await? {
            stats.employers_new += 1;
        }
        vacancy.insert(&mut *conn).await?;
        stats.vacancies += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::collectors::tests::{FixtureSource, fixture};

    #[tokio::test]
    async fn collect_all_sums_per_company_stats() {
        let source = FixtureSource {
            responses: HashMap::from([
                ("Yandex".to_string(), fixture()),
                ("IBS".to_string(), fixture()),
            ]),
        };
        let mut collector = Collector::new();

        let total = collect_all(&mut collector, &source, &["Yandex".into(), "IBS".into()])
            .await
            .unwrap();

        assert_eq!(
            total,
            CollectStats {
                fetched: 8,
                added: 6,
                skipped: 2,
            }
        );
        assert_eq!(collector.len(), 6);
    }

    #[tokio::test]
    async fn collect_all_stops_at_the_first_failure() {
        let source = FixtureSource {
            responses: HashMap::from([("Yandex".to_string(), fixture())]),
        };
        let mut collector = Collector::new();

        let result = collect_all(
            &mut collector,
            &source,
            &["Missing".into(), "Yandex".into()],
        )
        .await;

        assert!(result.is_err());
        assert!(collector.is_empty());
    }
}
