use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CompanyVacancyCount {
    pub employer_name: Option<String>,
    pub vacancy_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct VacancyListing {
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub currency: Option<String>,
    pub url: Option<String>,
}

/// A vacancy joined with its employer, as returned by keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct VacancyWithEmployer {
    pub employer_id: i64,
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
    pub employer_name: Option<String>,
    pub hh_url: Option<String>,
    pub address_city: Option<String>,
    pub address_street: Option<String>,
    pub address_building: Option<String>,
}
