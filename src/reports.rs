use sqlx::PgPool;

use crate::error::AppError;
use crate::models::report::{CompanyVacancyCount, VacancyListing, VacancyWithEmployer};
use crate::models::vacancy::VacancyRow;

/// Per-row salary used by the average: `salary_from`, else `salary_to`, else
/// the midpoint. Null when the row has no salary at all.
const EFFECTIVE_SALARY: &str =
    "coalesce(v.salary_from, v.salary_to, (v.salary_from + v.salary_to) / 2)";

/// Canned reporting queries over the loaded tables.
pub struct DbManager {
    pool: PgPool,
}

impl DbManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Employers with their vacancy counts, busiest first.
    pub async fn companies_and_vacancies_count(
        &self,
    ) -> Result<Vec<CompanyVacancyCount>, AppError> {
        let rows = sqlx::query_as::<_, CompanyVacancyCount>(
            "SELECT e.employer_name, COUNT(*) AS vacancy_count
             FROM vacancies v
             LEFT JOIN employers e USING (employer_id)
             GROUP BY e.employer_name
             ORDER BY COUNT(*) DESC, e.employer_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every vacancy with its employer name, ordered by employer.
    pub async fn all_vacancies(&self) -> Result<Vec<VacancyListing>, AppError> {
        let rows = sqlx::query_as::<_, VacancyListing>(
            "SELECT e.employer_name, v.job_title, v.salary_from, v.salary_to, v.currency, v.url
             FROM vacancies v
             LEFT JOIN employers e USING (employer_id)
             ORDER BY e.employer_name, v.vacancy_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Rounded average salary across all vacancies.
    /// `None` when no vacancy carries a salary.
    pub async fn avg_salary(&self) -> Result<Option<i64>, AppError> {
        let row: (Option<i64>,) = sqlx::query_as(&format!(
            "SELECT round(avg({EFFECTIVE_SALARY}))::bigint FROM vacancies v"
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    /// Vacancies whose salary is strictly above the average.
    pub async fn vacancies_with_higher_salary(&self) -> Result<Vec<VacancyRow>, AppError> {
        let rows = sqlx::query_as::<_, VacancyRow>(&format!(
            "SELECT v.*
             FROM vacancies v
             WHERE {EFFECTIVE_SALARY} > (SELECT avg({EFFECTIVE_SALARY}) FROM vacancies v)
             ORDER BY v.vacancy_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Vacancies where any keyword occurs, ignoring case, in any vacancy or
    /// employer column.
    pub async fn vacancies_with_keyword(
        &self,
        keywords: &[String],
    ) -> Result<Vec<VacancyWithEmployer>, AppError> {
        let patterns = like_patterns(keywords);
        let rows = sqlx::query_as::<_, VacancyWithEmployer>(
            "SELECT employer_id, v.vacancy_id, v.job_title, v.url, v.area, v.salary_from,
                    v.salary_to, v.currency, v.requirements, v.published, v.employment,
                    v.experience, e.employer_name, e.hh_url, e.address_city,
                    e.address_street, e.address_building
             FROM vacancies v
             JOIN employers e USING (employer_id)
             WHERE EXISTS (
                 SELECT 1
                 FROM unnest(ARRAY[
                     v.vacancy_id::text, v.job_title, v.url, v.area, v.salary_from::text,
                     v.salary_to::text, v.currency, v.requirements, v.published::text,
                     v.employment, v.experience, employer_id::text, e.employer_name,
                     e.hh_url, e.address_city, e.address_street, e.address_building
                 ]) AS f(value)
                 WHERE f.value ILIKE ANY ($1)
             )
             ORDER BY v.vacancy_id",
        )
        .bind(patterns)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// `%keyword%` patterns with LIKE wildcards in the keyword matched literally.
pub fn like_patterns(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|word| format!("%{}%", escape_like(word)))
        .collect()
}

fn escape_like(word: &str) -> String {
    let mut escaped = String::with_capacity(word.len());
    for c in word.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
