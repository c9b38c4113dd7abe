use clap::Parser;
use sqlx::postgres::PgConnectOptions;

use crate::collectors::headhunter::DEFAULT_API_URL;

/// Companies searched when no `--company` is given.
pub const DEFAULT_COMPANIES: [&str; 10] = [
    "LC Group",
    "IBS",
    "Rover",
    "R-Style",
    "Rosco",
    "Марвел",
    "Verysell",
    "Yandex",
    "Газпром",
    "Тинькофф",
];

/// Keywords searched after a load when no `--keyword` is given.
pub const DEFAULT_KEYWORDS: [&str; 2] = ["инженер", "редактор"];

#[derive(Parser, Debug, Clone)]
#[command(name = "hh-vacancies", about = "Collect hh.ru vacancies into PostgreSQL")]
pub struct Config {
    /// Database server host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database server port
    #[arg(long, env = "DB_PORT", default_value = "5432")]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// Database to create (if missing) and use
    #[arg(long, env = "DB_NAME", default_value = "hh_vacancies")]
    pub db_name: String,

    /// Base URL of the HeadHunter API
    #[arg(long, env = "HH_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Print report rows as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch vacancies, load them into fresh tables and run a keyword search
    /// (default when no subcommand given)
    Load {
        /// Company to search for; repeat or comma-separate for several
        #[arg(long = "company", value_delimiter = ',')]
        companies: Vec<String>,

        /// Keyword for the post-load search; repeat or comma-separate for several
        #[arg(long = "keyword", value_delimiter = ',')]
        keywords: Vec<String>,
    },
    /// Run one report against an already loaded database
    Report {
        #[command(subcommand)]
        report: Report,
    },
}

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Vacancy count per employer
    Companies,
    /// Every vacancy with its employer
    All,
    /// Average salary across all vacancies
    AvgSalary,
    /// Vacancies paying more than the average
    AboveAverage,
    /// Vacancies mentioning any of the keywords
    Search {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
}

impl Config {
    /// Resolve the command, defaulting to Load if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Load {
            companies: Vec::new(),
            keywords: Vec::new(),
        })
    }

    /// Connection options for the server, without a database selected.
    pub fn server_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
    }

    /// Connection options for the vacancies database.
    pub fn database_options(&self) -> PgConnectOptions {
        self.server_options().database(&self.db_name)
    }
}

/// Fill in the built-in list when the caller gave nothing.
pub fn or_defaults(values: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_resolves_to_load() {
        let config = Config::try_parse_from(["hh-vacancies"]).unwrap();
        assert_eq!(
            config.resolved_command(),
            Command::Load {
                companies: vec![],
                keywords: vec![],
            }
        );
        assert_eq!(config.db_name, "hh_vacancies");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn load_accepts_repeated_and_comma_separated_values() {
        let config = Config::try_parse_from([
            "hh-vacancies",
            "load",
            "--company",
            "Yandex,IBS",
            "--company",
            "Rosco",
            "--keyword",
            "rust",
        ])
        .unwrap();
        assert_eq!(
            config.resolved_command(),
            Command::Load {
                companies: vec!["Yandex".into(), "IBS".into(), "Rosco".into()],
                keywords: vec!["rust".into()],
            }
        );
    }

    #[test]
    fn search_report_requires_keywords() {
        assert!(Config::try_parse_from(["hh-vacancies", "report", "search"]).is_err());

        let config =
            Config::try_parse_from(["hh-vacancies", "--json", "report", "search", "sql", "go"])
                .unwrap();
        assert!(config.json);
        assert_eq!(
            config.resolved_command(),
            Command::Report {
                report: Report::Search {
                    keywords: vec!["sql".into(), "go".into()],
                },
            }
        );
    }

    #[test]
    fn empty_lists_fall_back_to_defaults() {
        let companies = or_defaults(vec![], &DEFAULT_COMPANIES);
        assert_eq!(companies.len(), 10);
        assert_eq!(companies[0], "LC Group");

        let keywords = or_defaults(vec!["rust".into()], &DEFAULT_KEYWORDS);
        assert_eq!(keywords, vec!["rust".to_string()]);
    }
}
