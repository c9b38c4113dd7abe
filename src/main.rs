use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hh_vacancies::collectors::headhunter::HeadHunterApi;
use hh_vacancies::collectors::runner;
use hh_vacancies::config::{
    Command, Config, DEFAULT_COMPANIES, DEFAULT_KEYWORDS, Report, or_defaults,
};
use hh_vacancies::db;
use hh_vacancies::reports::DbManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hh_vacancies=info")),
        )
        .init();

    let config = Config::parse();

    match config.resolved_command() {
        Command::Load {
            companies,
            keywords,
        } => {
            let pool = db::connect_or_create(&config.server_options(), &config.db_name).await?;
            db::create_tables(&pool).await?;

            let api = HeadHunterApi::new(config.api_url.as_str())?;
            let companies = or_defaults(companies, &DEFAULT_COMPANIES);
            runner::run(&pool, &api, &companies).await?;

            let keywords = or_defaults(keywords, &DEFAULT_KEYWORDS);
            let manager = DbManager::new(pool.clone());
            let rows = manager.vacancies_with_keyword(&keywords).await?;
            print_rows(&rows, config.json, |r| {
                format!(
                    "{} | {} | {} | {}",
                    r.employer_name.as_deref().unwrap_or("-"),
                    r.job_title.as_deref().unwrap_or("-"),
                    salary_range(r.salary_from, r.salary_to, r.currency.as_deref()),
                    r.url.as_deref().unwrap_or("-")
                )
            })?;
            pool.close().await;
        }
        Command::Report { report } => {
            let pool = db::create_pool(config.database_options()).await?;
            let manager = DbManager::new(pool.clone());
            run_report(&manager, report, config.json).await?;
            pool.close().await;
        }
    }

    Ok(())
}

async fn run_report(manager: &DbManager, report: Report, json: bool) -> anyhow::Result<()> {
    match report {
        Report::Companies => {
            let rows = manager.companies_and_vacancies_count().await?;
            print_rows(&rows, json, |r| {
                format!(
                    "{}: {}",
                    r.employer_name.as_deref().unwrap_or("-"),
                    r.vacancy_count
                )
            })?;
        }
        Report::All => {
            let rows = manager.all_vacancies().await?;
            print_rows(&rows, json, |r| {
                format!(
                    "{} | {} | {} | {}",
                    r.employer_name.as_deref().unwrap_or("-"),
                    r.job_title.as_deref().unwrap_or("-"),
                    salary_range(r.salary_from, r.salary_to, r.currency.as_deref()),
                    r.url.as_deref().unwrap_or("-")
                )
            })?;
        }
        Report::AvgSalary => {
            let avg = manager.avg_salary().await?;
            if json {
                println!("{}", serde_json::json!({ "avg_salary": avg }));
            } else {
                match avg {
                    Some(avg) => println!("Average salary is {avg} RUR among all vacancies"),
                    None => println!("No vacancies with a salary"),
                }
            }
        }
        Report::AboveAverage => {
            let rows = manager.vacancies_with_higher_salary().await?;
            print_rows(&rows, json, |r| {
                format!(
                    "{} | {} | {}",
                    r.job_title.as_deref().unwrap_or("-"),
                    salary_range(r.salary_from, r.salary_to, r.currency.as_deref()),
                    r.url.as_deref().unwrap_or("-")
                )
            })?;
        }
        Report::Search { keywords } => {
            let rows = manager.vacancies_with_keyword(&keywords).await?;
            print_rows(&rows, json, |r| {
                format!(
                    "{} | {} | {} | {}",
                    r.employer_name.as_deref().unwrap_or("-"),
                    r.job_title.as_deref().unwrap_or("-"),
                    salary_range(r.salary_from, r.salary_to, r.currency.as_deref()),
                    r.url.as_deref().unwrap_or("-")
                )
            })?;
        }
    }
    Ok(())
}

fn print_rows<T: Serialize>(
    rows: &[T],
    json: bool,
    line: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else {
        for row in rows {
            println!("{}", line(row));
        }
        println!("({} rows)", rows.len());
    }
    Ok(())
}

fn salary_range(from: Option<i32>, to: Option<i32>, currency: Option<&str>) -> String {
    let currency = currency.unwrap_or("");
    match (from, to) {
        (Some(from), Some(to)) => format!("{from}-{to} {currency}"),
        (Some(from), None) => format!("from {from} {currency}"),
        (None, Some(to)) => format!("up to {to} {currency}"),
        (None, None) => "-".to_string(),
    }
}
