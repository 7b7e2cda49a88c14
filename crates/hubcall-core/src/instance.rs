//! GitHub instance handling for public and enterprise deployments.
//!
//! The public multi-tenant host (`github.com`) serves its API from
//! `api.github.com`; every other host is treated as GitHub Enterprise
//! Server and serves the API under `/api/v3`.

/// Known GitHub cloud hostname.
pub const GITHUB_COM: &str = "github.com";

/// GitHub localhost for development.
const LOCALHOST: &str = "github.localhost";

/// Normalize a GitHub hostname by removing protocol and trailing slashes.
pub fn normalize_hostname(host: &str) -> String {
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);

    let host = host.trim_end_matches('/');

    host.to_lowercase()
}

/// Check if a hostname is the public GitHub.com instance.
pub fn is_github_com(host: &str) -> bool {
    let normalized = normalize_hostname(host);
    normalized == GITHUB_COM || normalized == LOCALHOST
}

/// Get the REST API base URL for a given hostname, with a trailing slash.
pub fn rest_url(host: &str) -> String {
    let normalized = normalize_hostname(host);
    if is_github_com(&normalized) {
        "https://api.github.com/".to_string()
    } else {
        format!("https://{normalized}/api/v3/")
    }
}

/// Get the GraphQL API endpoint for a given hostname.
pub fn graphql_url(host: &str) -> String {
    let normalized = normalize_hostname(host);
    if is_github_com(&normalized) {
        "https://api.github.com/graphql".to_string()
    } else {
        format!("https://{normalized}/api/v3/graphql")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("GitHub.com", "github.com")]
    #[case("https://github.com/", "github.com")]
    #[case("http://github.com/", "github.com")]
    #[case("https://my-ghe.example.com", "my-ghe.example.com")]
    #[case("https://ghe.io///", "ghe.io")]
    #[case("github.com/", "github.com")]
    fn test_should_normalize_hostname(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_hostname(input), expected);
    }

    #[rstest]
    #[case("github.com", true)]
    #[case("GITHUB.COM", true)]
    #[case("https://github.com", true)]
    #[case("github.localhost", true)]
    #[case("enterprise.example.com", false)]
    #[case("github.com.evil.com", false)]
    fn test_should_detect_github_com(#[case] host: &str, #[case] expected: bool) {
        assert_eq!(is_github_com(host), expected);
    }

    #[rstest]
    #[case("github.com", "https://api.github.com/")]
    #[case("GitHub.com", "https://api.github.com/")]
    #[case("ghe.example.com", "https://ghe.example.com/api/v3/")]
    #[case("https://ghe.example.com/", "https://ghe.example.com/api/v3/")]
    fn test_should_generate_rest_urls(#[case] host: &str, #[case] expected: &str) {
        assert_eq!(rest_url(host), expected);
    }

    #[rstest]
    #[case("github.com", "https://api.github.com/graphql")]
    #[case("ghe.example.com", "https://ghe.example.com/api/v3/graphql")]
    fn test_should_generate_graphql_urls(#[case] host: &str, #[case] expected: &str) {
        assert_eq!(graphql_url(host), expected);
    }

    mod prop {
        use proptest::prelude::*;

        use super::super::*;

        proptest! {
            #[test]
            fn normalize_hostname_is_idempotent(host in "[a-z0-9]{1,20}(\\.[a-z]{2,6}){1,3}") {
                let once = normalize_hostname(&host);
                let twice = normalize_hostname(&once);
                prop_assert_eq!(&once, &twice);
            }

            #[test]
            fn enterprise_rest_url_is_under_api_v3(host in "[a-z]{3,10}\\.example\\.com") {
                let url = rest_url(&host);
                prop_assert!(url.ends_with("/api/v3/"));
                prop_assert!(url.starts_with("https://"));
            }
        }
    }
}
