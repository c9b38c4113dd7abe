use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, Connection, Executor, PgPool};

use crate::error::AppError;

const CREATE_EMPLOYERS: &str = "CREATE TABLE employers (
    employer_id bigint PRIMARY KEY,
    employer_name text,
    hh_url text,
    address_city text,
    address_street text,
    address_building text
)";

const CREATE_VACANCIES: &str = "CREATE TABLE vacancies (
    vacancy_id bigint PRIMARY KEY,
    job_title text,
    url text,
    area text,
    salary_from int,
    salary_to int,
    currency varchar(10),
    requirements text,
    published date,
    employment text,
    experience text,
    employer_id bigint REFERENCES employers(employer_id) ON DELETE CASCADE
)";

/// Create `db_name` on the server unless it already exists, then open a
/// single-connection pool to it.
pub async fn connect_or_create(
    server: &PgConnectOptions,
    db_name: &str,
) -> Result<PgPool, AppError> {
    tracing::info!("Connecting to database server...");
    match create_database(server, db_name).await {
        Ok(()) => tracing::info!("Created {db_name} database"),
        Err(e) if e.is_duplicate_database() => {
            tracing::debug!("Database {db_name} already exists");
        }
        Err(e) => return Err(e),
    }

    let pool = create_pool(server.clone().database(db_name)).await?;
    tracing::info!("Connected to {db_name} database");
    Ok(pool)
}

pub async fn create_pool(options: PgConnectOptions) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

async fn create_database(server: &PgConnectOptions, db_name: &str) -> Result<(), AppError> {
    // CREATE DATABASE cannot run inside a transaction or take a bound name.
    let mut conn = server.clone().database("postgres").connect().await?;
    let result = conn
        .execute(format!("CREATE DATABASE {}", quote_ident(db_name)).as_str())
        .await;
    conn.close().await?;
    result?;
    Ok(())
}

/// Drop and recreate `employers` and `vacancies`, leaving both empty.
pub async fn create_tables(pool: &PgPool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DROP TABLE IF EXISTS vacancies").execute(&mut *tx).await?;
    sqlx::query("DROP TABLE IF EXISTS employers").execute(&mut *tx).await?;
    sqlx::query(CREATE_EMPLOYERS).execute(&mut *tx).await?;
    sqlx::query(CREATE_VACANCIES).execute(&mut *tx).await?;
    tx.commit().await?;
    tracing::info!("Created employers and vacancies tables");
    Ok(())
}

/// Quote a Postgres identifier, doubling any embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
