use std::path::Path;

/// Deployment environment, selected by `RIVET_ENV`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Local,
    Development,
    Production,
    Testing,
    Custom(String),
}

impl Environment {
    /// Detect environment from RIVET_ENV or default to Local
    pub fn detect() -> Self {
        std::env::var("RIVET_ENV")
            .map(|name| Self::from_name(&name))
            .unwrap_or(Self::Local)
    }

    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "" | "local" => Self::Local,
            "development" | "dev" => Self::Development,
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Suffix of the environment specific `.env` files
    pub fn env_file_suffix(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
            Self::Custom(name) => name.as_str(),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.env_file_suffix())
    }
}

/// Load environment variables from .env files
///
/// Precedence (later overrides earlier):
/// 1. .env
/// 2. .env.local
/// 3. .env.{environment}
/// 4. .env.{environment}.local
/// 5. variables already set in the process
pub fn load_dotenv(project_root: &Path) -> Environment {
    let env = Environment::detect();
    let suffix = env.env_file_suffix();

    // dotenvy never overwrites, so the most specific file goes first
    let files = [
        format!(".env.{}.local", suffix),
        format!(".env.{}", suffix),
        ".env.local".to_string(),
        ".env".to_string(),
    ];
    for file in files {
        let path = project_root.join(file);
        if dotenvy::from_path(&path).is_ok() {
            tracing::debug!(path = %path.display(), "loaded env file");
        }
    }

    env
}

/// Get an environment variable with a default value
///
/// # Example
/// ```
/// use rivet::config::env;
///
/// let eager: bool = env("RIVET_EAGER", false);
/// ```
pub fn env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_optional(key).unwrap_or(default)
}

/// Get an optional environment variable
///
/// Unset and unparsable values both come back as `None`.
pub fn env_optional<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_names() {
        assert_eq!(Environment::from_name("prod"), Environment::Production);
        assert_eq!(Environment::from_name(""), Environment::Local);
        assert_eq!(
            Environment::from_name("qa"),
            Environment::Custom("qa".to_string())
        );
        assert_eq!(Environment::Testing.to_string(), "testing");
    }

    #[test]
    fn test_env_falls_back_on_unparsable() {
        std::env::set_var("RIVET_TEST_NOT_A_NUMBER", "abc");
        assert_eq!(env("RIVET_TEST_NOT_A_NUMBER", 7_u32), 7);
        assert_eq!(env_optional::<u32>("RIVET_TEST_UNSET_KEY"), None);
    }
}
