use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = "jobly.toml";

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw, |key| std::env::var(key).ok()).map_err(|e| {
            anyhow::anyhow!("invalid config file {}: {e:#}", config_path.display())
        })?;

        Ok(Self { config_path, file })
    }

    /// Load `path` if it exists; a missing file is not an error.
    pub fn load_optional(path: &Path) -> anyhow::Result<Option<Self>> {
        if path.exists() {
            Ok(Some(Self::load(path.to_path_buf())?))
        } else {
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub database: DatabaseConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    pub filter: Option<String>,
}

fn default_max_pool_size() -> usize {
    jobly::pool::DEFAULT_POOL_SIZE
}

impl ConfigFile {
    fn parse(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env(&lookup)?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        self.database.url = expand_env_vars(&self.database.url, lookup)?;
        if let Some(filter) = self.log.filter.as_mut() {
            *filter = expand_env_vars(filter, lookup)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        if self.database.max_pool_size == 0 {
            anyhow::bail!("database.max_pool_size must be at least 1");
        }
        Ok(())
    }
}

/// Effective connection and logging settings after every override is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub max_pool_size: usize,
    pub log_filter: Option<String>,
}

impl Settings {
    /// Precedence for the URL: `--database`, then `DATABASE_URL`, then the
    /// config file.
    pub fn resolve(
        config_path: &Path,
        config: Option<&ProjectConfig>,
        database_flag: Option<String>,
        database_env: Option<String>,
    ) -> anyhow::Result<Self> {
        let file = config.map(|c| &c.file);
        let database_url = database_flag
            .or(database_env)
            .filter(|url| !url.trim().is_empty())
            .or_else(|| file.map(|f| f.database.url.clone()));

        let Some(database_url) = database_url else {
            anyhow::bail!(
                "database URL is required: pass --database, set DATABASE_URL or provide {}",
                config_path.display()
            );
        };

        Ok(Self {
            database_url,
            max_pool_size: file
                .map(|f| f.database.max_pool_size)
                .unwrap_or_else(default_max_pool_size),
            log_filter: file.and_then(|f| f.log.filter.clone()),
        })
    }
}

/// Replace `${VAR}` references using `lookup`.
fn expand_env_vars(
    input: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = lookup(&key)
                .ok_or_else(|| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(key: &str) -> Option<String> {
        match key {
            "DB_HOST" => Some("db.internal".to_string()),
            "DB_NAME" => Some("jobly".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_references() {
        let out = expand_env_vars("postgres://${DB_HOST}/${DB_NAME}", &env).unwrap();
        assert_eq!(out, "postgres://db.internal/jobly");
    }

    #[test]
    fn missing_and_malformed_references_fail() {
        assert!(expand_env_vars("${NOPE}", &env).is_err());
        assert!(expand_env_vars("${DB_HOST", &env).is_err());
        assert!(expand_env_vars("${}", &env).is_err());
        assert_eq!(expand_env_vars("$HOME", &env).unwrap(), "$HOME");
    }

    #[test]
    fn parses_full_file() {
        let file = ConfigFile::parse(
            r#"
            [database]
            url = "postgres://${DB_HOST}/jobly"
            max_pool_size = 4

            [log]
            filter = "jobly=debug"
            "#,
            env,
        )
        .unwrap();
        assert_eq!(file.database.url, "postgres://db.internal/jobly");
        assert_eq!(file.database.max_pool_size, 4);
        assert_eq!(file.log.filter.as_deref(), Some("jobly=debug"));
    }

    #[test]
    fn defaults_pool_size_and_log() {
        let file = ConfigFile::parse("[database]\nurl = \"postgres://localhost/jobly\"\n", env)
            .unwrap();
        assert_eq!(file.database.max_pool_size, jobly::pool::DEFAULT_POOL_SIZE);
        assert!(file.log.filter.is_none());
    }

    #[test]
    fn rejects_empty_url_and_zero_pool() {
        let err = ConfigFile::parse("[database]\nurl = \"  \"\n", env).unwrap_err();
        assert!(err.to_string().contains("database.url"));

        let err = ConfigFile::parse(
            "[database]\nurl = \"postgres://localhost/jobly\"\nmax_pool_size = 0\n",
            env,
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_pool_size"));
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let cfg = ProjectConfig {
            config_path: PathBuf::from(DEFAULT_CONFIG),
            file: ConfigFile::parse("[database]\nurl = \"postgres://file/jobly\"\n", env)
                .unwrap(),
        };
        let path = Path::new(DEFAULT_CONFIG);

        let s = Settings::resolve(
            path,
            Some(&cfg),
            Some("postgres://flag/jobly".into()),
            Some("postgres://env/jobly".into()),
        )
        .unwrap();
        assert_eq!(s.database_url, "postgres://flag/jobly");

        let s = Settings::resolve(path, Some(&cfg), None, Some("postgres://env/jobly".into()))
            .unwrap();
        assert_eq!(s.database_url, "postgres://env/jobly");

        let s = Settings::resolve(path, Some(&cfg), None, None).unwrap();
        assert_eq!(s.database_url, "postgres://file/jobly");
    }

    #[test]
    fn url_is_required_somewhere() {
        let err = Settings::resolve(Path::new(DEFAULT_CONFIG), None, None, None).unwrap_err();
        assert!(err.to_string().contains("database URL is required"));
    }
}
