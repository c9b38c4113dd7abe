use serde::Serialize;
use sqlx::PgExecutor;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Employer {
    pub employer_id: i64,
    pub employer_name: Option<String>,
    pub hh_url: Option<String>,
    pub address_city: Option<String>,
    pub address_street: Option<String>,
    pub address_building: Option<String>,
}

impl Employer {
    /// Insert the employer unless its id is already present.
    /// The first row written for an id is kept as-is.
    /// Returns whether a row was inserted.
    pub async fn insert_ignore<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO employers (employer_id, employer_name, hh_url, address_city, address_street, address_building) VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT DO NOTHING",
        )
        .bind(self.employer_id)
        .bind(&self.employer_name)
        .bind(&self.hh_url)
        .bind(&self.address_city)
        .bind(&self.address_street)
        .bind(&self.address_building)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get<'e, E: PgExecutor<'e>>(executor: E, id: i64) -> Result<Employer, AppError> {
        sqlx::query_as::<_, Employer>("SELECT * FROM employers WHERE employer_id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employer {id} not found")))
    }

    pub async fn count<'e, E: PgExecutor<'e>>(executor: E) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employers")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}
