// These tests need a PostgreSQL server reachable through DATABASE_URL;
// `#[sqlx::test]` creates a throwaway database for each one.
// Run with `cargo test -- --ignored`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::PgPool;

use hh_vacancies::collectors::headhunter::normalize;
use hh_vacancies::collectors::runner::{self, LoadStats};
use hh_vacancies::collectors::{CollectStats, VacancySource};
use hh_vacancies::db;
use hh_vacancies::error::AppError;
use hh_vacancies::models::employer::Employer;
use hh_vacancies::models::vacancy::{Vacancy, VacancyRow};
use hh_vacancies::reports::DbManager;

fn fixture() -> Value {
    serde_json::from_str(include_str!("fixtures/vacancies.json")).unwrap()
}

struct FixtureSource(HashMap<String, Value>);

#[async_trait]
impl VacancySource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch(&self, company: &str) -> Result<Value, AppError> {
        self.0
            .get(company)
            .cloned()
            .ok_or_else(|| AppError::NotFound(company.to_string()))
    }
}

fn vacancy(id: i64, salary_from: Option<i32>, salary_to: Option<i32>) -> Vacancy {
    Vacancy {
        vacancy_id: id,
        name: format!("Vacancy {id}"),
        url: format!("https://hh.ru/vacancy/{id}"),
        area: "Москва".into(),
        salary_from,
        salary_to,
        currency: "RUR".into(),
        requirements: None,
        published: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        employment_type: "Полный день".into(),
        experience: "Нет опыта".into(),
        employer_id: 1,
        employer_name: "Acme".into(),
        employer_url: "https://hh.ru/employer/1".into(),
        employer_address_city: None,
        employer_address_street: None,
        employer_address_building: None,
    }
}

async fn load(pool: &PgPool, vacancies: &[Vacancy]) -> LoadStats {
    db::create_tables(pool).await.unwrap();
    let mut tx = pool.begin().await.unwrap();
    let stats = runner::load_vacancies(&mut tx, vacancies).await.unwrap();
    tx.commit().await.unwrap();
    stats
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn run_loads_fixture_rows_verbatim(pool: PgPool) {
    db::create_tables(&pool).await.unwrap();
    let source = FixtureSource(HashMap::from([("Yandex".to_string(), fixture())]));

    let summary = runner::run(&pool, &source, &["Yandex".to_string()])
        .await
        .unwrap();

    assert_eq!(
        summary.collected,
        CollectStats {
            fetched: 4,
            added: 3,
            skipped: 1,
        }
    );
    assert_eq!(
        summary.loaded,
        LoadStats {
            employers_new: 2,
            vacancies: 3,
        }
    );

    let row = VacancyRow::get(&pool, 93350151).await.unwrap();
    assert_eq!(
        row,
        VacancyRow {
            vacancy_id: 93350151,
            job_title: Some("Инженер по тестированию".into()),
            url: Some("https://hh.ru/vacancy/93350151".into()),
            area: Some("Москва".into()),
            salary_from: Some(150000),
            salary_to: Some(200000),
            currency: Some("RUR".into()),
            requirements: Some("Опыт работы с <highlighttext>SQL</highlighttext>".into()),
            published: NaiveDate::from_ymd_opt(2024, 2, 29),
            employment: Some("Полный день".into()),
            experience: Some("От 1 года до 3 лет".into()),
            employer_id: Some(1740),
        }
    );

    let employer = Employer::get(&pool, 1740).await.unwrap();
    assert_eq!(
        employer,
        Employer {
            employer_id: 1740,
            employer_name: Some("Яндекс".into()),
            hh_url: Some("https://hh.ru/employer/1740".into()),
            address_city: Some("Москва".into()),
            address_street: Some("улица Льва Толстого".into()),
            address_building: Some("16".into()),
        }
    );

    let gazprom = Employer::get(&pool, 39305).await.unwrap();
    assert_eq!(gazprom.address_city, None);
    assert!(matches!(
        VacancyRow::get(&pool, 93350153).await,
        Err(AppError::NotFound(_))
    ));
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn employer_upsert_keeps_first_seen_row(pool: PgPool) {
    let first = vacancy(1, Some(100), None);
    let mut second = vacancy(2, Some(200), None);
    second.employer_name = "Acme Renamed".into();
    second.employer_address_city = Some("Казань".into());

    let stats = load(&pool, &[first, second]).await;

    assert_eq!(stats.employers_new, 1);
    assert_eq!(stats.vacancies, 2);
    assert_eq!(Employer::count(&pool).await.unwrap(), 1);
    let employer = Employer::get(&pool, 1).await.unwrap();
    assert_eq!(employer.employer_name.as_deref(), Some("Acme"));
    assert_eq!(employer.address_city, None);

    let again = vacancy(1, None, None).employer();
    assert!(!again.insert_ignore(&pool).await.unwrap());
    assert_eq!(Employer::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn duplicate_vacancy_aborts_the_load(pool: PgPool) {
    db::create_tables(&pool).await.unwrap();
    let mut tx = pool.begin().await.unwrap();
    let result =
        runner::load_vacancies(&mut tx, &[vacancy(1, None, None), vacancy(1, None, None)]).await;
    assert!(matches!(result, Err(AppError::Database(_))));
    drop(tx);

    assert_eq!(VacancyRow::count(&pool).await.unwrap(), 0);
    assert_eq!(Employer::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn average_salary_follows_the_fallback_chain(pool: PgPool) {
    load(
        &pool,
        &[
            vacancy(1, Some(100_000), Some(300_000)),
            vacancy(2, None, Some(50_000)),
            vacancy(3, None, None),
            vacancy(4, Some(90_000), None),
        ],
    )
    .await;
    let manager = DbManager::new(pool.clone());

    // (100000 + 50000 + 90000) / 3; the salary-less row is not counted.
    assert_eq!(manager.avg_salary().await.unwrap(), Some(80_000));

    let above: Vec<i64> = manager
        .vacancies_with_higher_salary()
        .await
        .unwrap()
        .iter()
        .map(|r| r.vacancy_id)
        .collect();
    assert_eq!(above, vec![1, 4]);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn average_salary_is_none_without_salaries(pool: PgPool) {
    load(&pool, &[vacancy(1, None, None)]).await;
    let manager = DbManager::new(pool.clone());

    assert_eq!(manager.avg_salary().await.unwrap(), None);
    assert!(manager.vacancies_with_higher_salary().await.unwrap().is_empty());
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn counts_and_listing_join_employers(pool: PgPool) {
    let items = fixture();
    let vacancies: Vec<Vacancy> = items["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|raw| normalize(raw).ok())
        .collect();
    load(&pool, &vacancies).await;
    let manager = DbManager::new(pool.clone());

    let counts = manager.companies_and_vacancies_count().await.unwrap();
    let counts: Vec<(Option<String>, i64)> = counts
        .into_iter()
        .map(|c| (c.employer_name, c.vacancy_count))
        .collect();
    assert_eq!(
        counts,
        vec![
            (Some("Яндекс".to_string()), 2),
            (Some("Газпром нефть".to_string()), 1),
        ]
    );

    let listing = manager.all_vacancies().await.unwrap();
    assert_eq!(listing.len(), 3);
    assert_eq!(listing[0].employer_name.as_deref(), Some("Газпром нефть"));
    assert_eq!(listing[0].salary_from, None);
    assert_eq!(listing[1].job_title.as_deref(), Some("Инженер по тестированию"));
}

#[sqlx::test(migrations = false)]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn keyword_search_matches_any_field_ignoring_case(pool: PgPool) {
    let items = fixture();
    let vacancies: Vec<Vacancy> = items["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|raw| normalize(raw).ok())
        .collect();
    load(&pool, &vacancies).await;
    let manager = DbManager::new(pool.clone());

    let ids = |rows: Vec<hh_vacancies::models::report::VacancyWithEmployer>| {
        rows.iter().map(|r| r.vacancy_id).collect::<Vec<_>>()
    };

    // Any of several keywords, in titles.
    let rows = manager
        .vacancies_with_keyword(&["Инженер".into(), "Редактор".into()])
        .await
        .unwrap();
    assert_eq!(ids(rows), vec![93350151, 93350154]);

    // Title, in a different case.
    let rows = manager
        .vacancies_with_keyword(&["BACKEND".into()])
        .await
        .unwrap();
    assert_eq!(ids(rows), vec![93350152]);

    // Employer address only.
    let rows = manager
        .vacancies_with_keyword(&["Толстого".into()])
        .await
        .unwrap();
    assert_eq!(ids(rows), vec![93350151, 93350152]);

    // Requirements text.
    let rows = manager.vacancies_with_keyword(&["sql".into()]).await.unwrap();
    assert_eq!(ids(rows), vec![93350151]);

    // Wildcards are literal.
    let rows = manager.vacancies_with_keyword(&["%".into()]).await.unwrap();
    assert!(rows.is_empty());

    let rows = manager.vacancies_with_keyword(&[]).await.unwrap();
    assert!(rows.is_empty());

    let rows = manager
        .vacancies_with_keyword(&["python".into()])
        .await
        .unwrap();
    assert!(rows.is_empty());
}
