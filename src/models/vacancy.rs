use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgExecutor;

use crate::error::AppError;
use crate::models::employer::Employer;

/// A normalized vacancy as collected from the API, before it is persisted.
/// Carries the employer fields seen at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vacancy {
    pub vacancy_id: i64,
    pub name: String,
    pub url: String,
    pub area: String,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub currency: String,
    pub requirements: Option<String>,
    pub published: NaiveDate,
    pub employment_type: String,
    pub experience: String,
    pub employer_id: i64,
    pub employer_name: String,
    pub employer_url: String,
    pub employer_address_city: Option<String>,
    pub employer_address_street: Option<String>,
    pub employer_address_building: Option<String>,
}

/// A row of the `vacancies` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct VacancyRow {
    pub vacancy_id: i64,
    pub job_title: Option<String>,
    pub url: Option<String>,
    pub area: Option<String>,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub currency: Option<String>,
    pub requirements: Option<String>,
    pub published: Option<NaiveDate>,
    pub employment: Option<String>,
    pub experience: Option<String>,
    pub employer_id: Option<i64>,
}

impl Vacancy {
    /// The employer half of this record, as it goes into `employers`.
    pub fn employer(&self) -> Employer {
        Employer {
            employer_id: self.employer_id,
            employer_name: Some(self.employer_name.clone()),
            hh_url: Some(self.employer_url.clone()),
            address_city: self.employer_address_city.clone(),
            address_street: self.employer_address_street.clone(),
            address_building: self.employer_address_building.clone(),
        }
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO vacancies (vacancy_id, job_title, url, area, salary_from, salary_to, currency, requirements, published, employment, experience, employer_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(self.vacancy_id)
        .bind(&self.name)
        .bind(&self.url)
        .bind(&self.area)
        .bind(self.salary_from)
        .bind(self.salary_to)
        .bind(&self.currency)
        .bind(&self.requirements)
        .bind(self.published)
        .bind(&self.employment_type)
        .bind(&self.experience)
        .bind(self.employer_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

impl VacancyRow {
    pub async fn get<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<VacancyRow, AppError> {
        sqlx::query_as::<_, VacancyRow>("SELECT * FROM vacancies WHERE vacancy_id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vacancy {id} not found")))
    }

    pub async fn count<'e, E: PgExecutor<'e>>(executor: E) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vacancies")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}
