use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::collectors::VacancySource;
use crate::error::{AppError, NormalizeError};
use crate::models::vacancy::Vacancy;

pub const DEFAULT_API_URL: &str = "https://api.hh.ru";
const PER_PAGE: u32 = 50;
/// hh.ru area code for Russia.
const AREA: u32 = 113;
const USER_AGENT: &str = concat!("hh-vacancies/", env!("CARGO_PKG_VERSION"));

pub struct HeadHunterApi {
    client: reqwest::Client,
    base_url: String,
}

impl HeadHunterApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl VacancySource for HeadHunterApi {
    fn name(&self) -> &str {
        "hh.ru"
    }

    /// One search request for vacancies published by `company`.
    /// Only the first page is fetched.
    async fn fetch(&self, company: &str) -> Result<Value, AppError> {
        let url = format!("{}/vacancies", self.base_url);
        let text = format!("COMPANY_NAME:{company}");
        let per_page = PER_PAGE.to_string();
        let area = AREA.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("text", text.as_str()),
                ("per_page", per_page.as_str()),
                ("only_with_salary", "true"),
                ("area", area.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let data: Value = resp.json().await?;
        Ok(data)
    }
}

/// Pull the `items` array out of a search response.
pub fn items(data: &Value) -> Result<&[Value], AppError> {
    data.get("items")
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .ok_or_else(|| AppError::InvalidResponse("Missing 'items' in response".to_string()))
}

/// Map one raw search item onto a flat vacancy record.
pub fn normalize(raw: &Value) -> Result<Vacancy, NormalizeError> {
    let salary = object(raw, "salary")?;
    let employer = object(raw, "employer")?;

    // `address` must be present but may be null.
    let address = field(raw, "address")?;
    let (city, street, building) = if address.is_null() {
        (None, None, None)
    } else {
        (
            opt_str(address, "city", "address.city")?,
            opt_str(address, "street", "address.street")?,
            opt_str(address, "building", "address.building")?,
        )
    };

    Ok(Vacancy {
        vacancy_id: id(raw, "id", "id")?,
        name: string(raw, "name", "name")?,
        url: string(raw, "alternate_url", "alternate_url")?,
        area: string(object(raw, "area")?, "name", "area.name")?,
        salary_from: salary_amount(salary, "from", "salary.from")?,
        salary_to: salary_amount(salary, "to", "salary.to")?,
        currency: string(salary, "currency", "salary.currency")?,
        requirements: opt_str(object(raw, "snippet")?, "requirement", "snippet.requirement")?,
        published: published_date(&string(raw, "published_at", "published_at")?)
            .ok_or(NormalizeError::InvalidField("published_at"))?,
        employment_type: string(object(raw, "schedule")?, "name", "schedule.name")?,
        experience: string(object(raw, "experience")?, "name", "experience.name")?,
        employer_id: id(employer, "id", "employer.id")?,
        employer_name: string(employer, "name", "employer.name")?,
        employer_url: string(employer, "alternate_url", "employer.alternate_url")?,
        employer_address_city: city,
        employer_address_street: street,
        employer_address_building: building,
    })
}

/// Calendar date of an hh.ru timestamp such as `2024-03-01T12:30:00+0300`,
/// taken in the timestamp's own offset.
pub fn published_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(ts.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn field<'a>(obj: &'a Value, key: &'static str) -> Result<&'a Value, NormalizeError> {
    obj.get(key).ok_or(NormalizeError::MissingField(key))
}

fn object<'a>(obj: &'a Value, key: &'static str) -> Result<&'a Value, NormalizeError> {
    let value = field(obj, key)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(NormalizeError::InvalidField(key))
    }
}

fn string(obj: &Value, key: &'static str, path: &'static str) -> Result<String, NormalizeError> {
    obj.get(key)
        .ok_or(NormalizeError::MissingField(path))?
        .as_str()
        .map(String::from)
        .ok_or(NormalizeError::InvalidField(path))
}

fn opt_str(
    obj: &Value,
    key: &'static str,
    path: &'static str,
) -> Result<Option<String>, NormalizeError> {
    match obj.get(key).ok_or(NormalizeError::MissingField(path))? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(NormalizeError::InvalidField(path)),
    }
}

/// hh.ru sends ids as numeric strings; plain numbers are accepted too.
fn id(obj: &Value, key: &'static str, path: &'static str) -> Result<i64, NormalizeError> {
    match obj.get(key).ok_or(NormalizeError::MissingField(path))? {
        Value::String(s) => s.trim().parse().map_err(|_| NormalizeError::InvalidField(path)),
        Value::Number(n) => n.as_i64().ok_or(NormalizeError::InvalidField(path)),
        _ => Err(NormalizeError::InvalidField(path)),
    }
}

/// A missing bound comes as null; zero is treated the same way.
/// Fractional amounts are rounded to the nearest unit.
fn salary_amount(
    salary: &Value,
    key: &'static str,
    path: &'static str,
) -> Result<Option<i32>, NormalizeError> {
    let value = salary.get(key).ok_or(NormalizeError::MissingField(path))?;
    if value.is_null() {
        return Ok(None);
    }
    let amount = value
        .as_f64()
        .ok_or(NormalizeError::InvalidField(path))?
        .round();
    if amount == 0.0 {
        return Ok(None);
    }
    if amount < i32::MIN as f64 || amount > i32::MAX as f64 {
        return Err(NormalizeError::InvalidField(path));
    }
    Ok(Some(amount as i32))
}
