use reqwest::Url;
use std::path::PathBuf;

use super::env::{EnvSource, parse_bool};
use super::environment::Environment;
use super::error::{FieldError, SettingsError};

/// Resolves fields one at a time, keeping every failure instead of stopping at
/// the first one.
#[derive(Debug, Default)]
pub(crate) struct FieldResolver {
    errors: Vec<FieldError>,
}

impl FieldResolver {
    /// Resolve `GROUP__FIELD` / `GROUP_FIELD` through `parse`, falling back to
    /// `default` when unset or invalid. Invalid input is recorded.
    pub fn resolve<T>(
        &mut self,
        env: &EnvSource,
        group: &str,
        field: &str,
        default: impl FnOnce() -> T,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> T {
        let Some(raw) = env.field(group, field) else {
            return default();
        };
        match parse(raw) {
            Ok(value) => value,
            Err(message) => {
                self.errors.push(FieldError {
                    field: format!(
                        "{}.{}",
                        group.to_ascii_lowercase(),
                        field.to_ascii_lowercase()
                    ),
                    input: raw.to_string(),
                    message,
                });
                default()
            }
        }
    }

    pub fn finish(self) -> Result<(), SettingsError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SettingsError::Validation(self.errors))
        }
    }
}

pub fn parse_environment(raw: &str) -> Result<Environment, String> {
    raw.parse::<Environment>().map_err(|err| err.to_string())
}

pub fn parse_path(raw: &str) -> Result<PathBuf, String> {
    Ok(PathBuf::from(raw))
}

/// Accept only absolute `http`/`https` URLs that carry a host.
pub fn parse_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|err| format!("input should be a valid URL, {err}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "URL scheme should be 'http' or 'https', got {:?}",
            url.scheme()
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("URL should have a host".to_string());
    }
    Ok(url)
}

pub fn parse_positive_int(raw: &str) -> Result<u64, String> {
    let value: i128 = raw
        .parse()
        .map_err(|_| "input should be a valid integer".to_string())?;
    if value <= 0 {
        return Err("input should be greater than 0".to_string());
    }
    u64::try_from(value).map_err(|_| "input is too large".to_string())
}

/// A positive integer no larger than `max`.
pub fn parse_bounded_int(raw: &str, max: u64) -> Result<u64, String> {
    let value: i128 = raw
        .parse()
        .map_err(|_| "input should be a valid integer".to_string())?;
    if value <= 0 {
        return Err("input should be greater than 0".to_string());
    }
    if value > i128::from(max) {
        return Err(format!("input should be at most {max}"));
    }
    u64::try_from(value).map_err(|_| format!("input should be at most {max}"))
}

pub fn parse_flag(raw: &str) -> Result<bool, String> {
    parse_bool(raw).ok_or_else(|| "input should be a valid boolean".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_urls_accepted() {
        assert!(parse_http_url("https://jsonplaceholder.typicode.com").is_ok());
        assert!(parse_http_url("http://127.0.0.1:8080/api").is_ok());
    }

    #[test]
    fn other_schemes_rejected() {
        let err = parse_http_url("ftp://example.com").unwrap_err();
        assert!(err.contains("'http' or 'https'"), "{err}");
    }

    #[test]
    fn relative_url_rejected() {
        assert!(parse_http_url("not a url").is_err());
    }

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(parse_positive_int("10"), Ok(10));
        assert_eq!(
            parse_positive_int("0"),
            Err("input should be greater than 0".to_string())
        );
        assert_eq!(
            parse_positive_int("-3"),
            Err("input should be greater than 0".to_string())
        );
        assert!(parse_positive_int("ten").is_err());
    }

    #[test]
    fn bounded_int_rejects_values_above_max() {
        assert_eq!(parse_bounded_int("86400", 86_400), Ok(86_400));
        assert_eq!(
            parse_bounded_int("86401", 86_400),
            Err("input should be at most 86400".to_string())
        );
        assert_eq!(
            parse_bounded_int("18446744073709551615", 86_400),
            Err("input should be at most 86400".to_string())
        );
        assert_eq!(
            parse_bounded_int("99999999999999999999999", 86_400),
            Err("input should be at most 86400".to_string())
        );
        assert_eq!(
            parse_bounded_int("0", 86_400),
            Err("input should be greater than 0".to_string())
        );
    }

    #[test]
    fn resolver_collects_every_failure() {
        let env = EnvSource::from_pairs([("G_A", "x"), ("G_B", "y")]);
        let mut resolver = FieldResolver::default();
        let a = resolver.resolve(&env, "G", "A", || 1u64, parse_positive_int);
        let b = resolver.resolve(&env, "G", "B", || false, parse_flag);
        let c = resolver.resolve(&env, "G", "C", || 3u64, parse_positive_int);
        assert_eq!((a, b, c), (1, false, 3));

        let err = resolver.finish().unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["g.a", "g.b"]);
    }
}
