use anyhow::Context;
use dotenvy::dotenv;
use std::env;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub stripe_secret_key: String,
    pub stripe_api_url: String,
    pub checkout: CheckoutUrls,
    pub cors_allowed_origins: AllowedOrigins,
}

/// Redirect targets handed to the payment processor when a hosted
/// checkout session completes or is abandoned.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let stripe_api_url =
            env::var("STRIPE_API_URL").unwrap_or_else(|_| DEFAULT_STRIPE_API_URL.to_string());
        Url::parse(&stripe_api_url).context("STRIPE_API_URL is not a valid URL")?;

        let success_url =
            env::var("CHECKOUT_SUCCESS_URL").context("CHECKOUT_SUCCESS_URL must be set")?;
        Url::parse(&success_url).context("CHECKOUT_SUCCESS_URL is not a valid URL")?;

        let cancel_url =
            env::var("CHECKOUT_CANCEL_URL").context("CHECKOUT_CANCEL_URL must be set")?;
        Url::parse(&cancel_url).context("CHECKOUT_CANCEL_URL is not a valid URL")?;

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .context("STRIPE_SECRET_KEY must be set")?,
            stripe_api_url,
            checkout: CheckoutUrls {
                success_url,
                cancel_url,
            },
            cors_allowed_origins: parse_allowed_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            )?,
        })
    }
}

fn parse_allowed_origins(raw: &str) -> anyhow::Result<AllowedOrigins> {
    let value = raw.trim();
    if value == "*" {
        return Ok(AllowedOrigins::Any);
    }

    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            Url::parse(entry)
                .with_context(|| format!("invalid CORS origin: {}", entry))
                .map(|_| entry.to_string())
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if origins.is_empty() {
        anyhow::bail!("CORS_ALLOWED_ORIGINS must be '*' or a comma-separated list of origins");
    }

    Ok(AllowedOrigins::List(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_allows_any_origin() {
        assert_eq!(parse_allowed_origins("*").unwrap(), AllowedOrigins::Any);
        assert_eq!(parse_allowed_origins("  *  ").unwrap(), AllowedOrigins::Any);
    }

    #[test]
    fn test_origin_list_parses() {
        let parsed = parse_allowed_origins("http://localhost:3000, http://127.0.0.1:5500").unwrap();
        assert_eq!(
            parsed,
            AllowedOrigins::List(vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:5500".to_string(),
            ])
        );
    }

    #[test]
    fn test_invalid_origin_rejected() {
        assert!(parse_allowed_origins("not a url").is_err());
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(parse_allowed_origins(" , ").is_err());
    }
}
