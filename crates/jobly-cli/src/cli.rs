use crate::config::DEFAULT_CONFIG;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Migrate,
    Companies,
    Jobs,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Migrate(GlobalArgs),
    Companies(CompaniesArgs),
    Jobs(JobsArgs),
}

/// Options every database command accepts.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: PathBuf,
    pub database: Option<String>,
}

impl Default for GlobalArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG),
            database: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompaniesArgs {
    pub global: GlobalArgs,
    pub min_employees: Option<i64>,
    pub max_employees: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JobsArgs {
    pub global: GlobalArgs,
    pub min_salary: Option<i64>,
    pub has_equity: bool,
    pub title: Option<String>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(|s| s.as_str());
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "migrate" => parse_migrate(it),
        "companies" => parse_companies(it),
        "jobs" => parse_jobs(it),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Split `--flag=value` into its parts; plain tokens pass through.
fn split_flag(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
        _ => (token, None),
    }
}

fn take_value<'a>(
    flag: &str,
    inline: Option<&'a str>,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<&'a str> {
    match inline.or_else(|| it.next()) {
        Some(v) => Ok(v),
        None => anyhow::bail!("{flag} requires a value"),
    }
}

fn take_number<'a>(
    flag: &str,
    inline: Option<&'a str>,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<i64> {
    let raw = take_value(flag, inline, it)?;
    raw.parse::<i64>()
        .map_err(|_| anyhow::anyhow!("{flag} expects an integer, got: {raw}"))
}

/// Handle `--config` / `--database`. Returns `false` for any other flag.
fn parse_global<'a>(
    global: &mut GlobalArgs,
    flag: &str,
    inline: Option<&'a str>,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<bool> {
    match flag {
        "--config" => global.config = PathBuf::from(take_value(flag, inline, it)?),
        "--database" => global.database = Some(take_value(flag, inline, it)?.to_string()),
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_migrate<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();

    while let Some(token) = it.next() {
        let (flag, inline) = split_flag(token);
        if matches!(flag, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Migrate));
        }
        if !parse_global(&mut global, flag, inline, &mut it)? {
            anyhow::bail!("unknown argument for migrate: {token}");
        }
    }

    Ok(Command::Migrate(global))
}

fn parse_companies<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut args = CompaniesArgs::default();

    while let Some(token) = it.next() {
        let (flag, inline) = split_flag(token);
        match flag {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Companies)),
            "--min-employees" => args.min_employees = Some(take_number(flag, inline, &mut it)?),
            "--max-employees" => args.max_employees = Some(take_number(flag, inline, &mut it)?),
            "--name" => args.name = Some(take_value(flag, inline, &mut it)?.to_string()),
            _ => {
                if !parse_global(&mut args.global, flag, inline, &mut it)? {
                    anyhow::bail!("unknown argument for companies: {token}");
                }
            }
        }
    }

    Ok(Command::Companies(args))
}

fn parse_jobs<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut args = JobsArgs::default();

    while let Some(token) = it.next() {
        let (flag, inline) = split_flag(token);
        match flag {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Jobs)),
            "--min-salary" => args.min_salary = Some(take_number(flag, inline, &mut it)?),
            "--has-equity" => args.has_equity = true,
            "--title" => args.title = Some(take_value(flag, inline, &mut it)?.to_string()),
            _ => {
                if !parse_global(&mut args.global, flag, inline, &mut it)? {
                    anyhow::bail!("unknown argument for jobs: {token}");
                }
            }
        }
    }

    Ok(Command::Jobs(args))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
jobly - operator CLI for the jobly data layer

USAGE:
  jobly <COMMAND> [OPTIONS]

COMMANDS:
  migrate       Apply pending schema migrations
  companies     List companies matching filters (JSON)
  jobs          List jobs matching filters (JSON)

GLOBAL OPTIONS:
  --config <FILE>       Config file path (default: jobly.toml)
  --database <URL>      Override database.url and DATABASE_URL
  -h, --help            Print help

Run `jobly <command> --help` for more."
            );
        }
        HelpTopic::Migrate => {
            println!(
                "\
USAGE:
  jobly migrate [--config <FILE>] [--database <URL>]

Applies every embedded migration not yet recorded in the database."
            );
        }
        HelpTopic::Companies => {
            println!(
                "\
USAGE:
  jobly companies [OPTIONS]

FILTERS:
  --min-employees <N>   Only companies with at least N employees
  --max-employees <N>   Only companies with at most N employees
  --name <TEXT>         Case-insensitive substring of the name

Results are ordered by name."
            );
        }
        HelpTopic::Jobs => {
            println!(
                "\
USAGE:
  jobly jobs [OPTIONS]

FILTERS:
  --min-salary <N>      Only jobs paying at least N
  --has-equity          Only jobs offering non-zero equity
  --title <TEXT>        Case-insensitive substring of the title

Results are ordered by title."
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        std::iter::once("jobly")
            .chain(tokens.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_arguments_prints_help() {
        let cmd = parse_args(&args(&[])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Root)));
    }

    #[test]
    fn parse_companies_filters() {
        let cmd = parse_args(&args(&[
            "companies",
            "--min-employees",
            "2",
            "--max-employees=10",
            "--name",
            "net",
            "--database=postgres://localhost/jobly",
        ]))
        .unwrap();
        let Command::Companies(c) = cmd else {
            panic!("expected companies");
        };
        assert_eq!(c.min_employees, Some(2));
        assert_eq!(c.max_employees, Some(10));
        assert_eq!(c.name.as_deref(), Some("net"));
        assert_eq!(c.global.database.as_deref(), Some("postgres://localhost/jobly"));
        assert_eq!(c.global.config, PathBuf::from("jobly.toml"));
    }

    #[test]
    fn parse_jobs_filters() {
        let cmd = parse_args(&args(&[
            "jobs",
            "--has-equity",
            "--title=J2",
            "--config",
            "conf/jobly.toml",
        ]))
        .unwrap();
        let Command::Jobs(j) = cmd else {
            panic!("expected jobs");
        };
        assert!(j.has_equity);
        assert_eq!(j.min_salary, None);
        assert_eq!(j.title.as_deref(), Some("J2"));
        assert_eq!(j.global.config, PathBuf::from("conf/jobly.toml"));
    }

    #[test]
    fn numeric_flags_must_be_integers() {
        let err = parse_args(&args(&["jobs", "--min-salary", "lots"])).unwrap_err();
        assert!(err.to_string().contains("--min-salary"));

        let err = parse_args(&args(&["companies", "--min-employees"])).unwrap_err();
        assert!(err.to_string().contains("requires a value"));
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(parse_args(&args(&["migrate", "--to", "3"])).is_err());
        assert!(parse_args(&args(&["users"])).is_err());
    }

    #[test]
    fn subcommand_help() {
        let cmd = parse_args(&args(&["jobs", "--help"])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Jobs)));
    }
}
