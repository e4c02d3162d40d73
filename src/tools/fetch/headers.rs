use crate::tools::credentials::CredentialSet;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, REFERER, USER_AGENT};
use url::Url;

/// Chrome on Windows, matching the `sec-ch-ua` hints below.
const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const ACCEPT_LANGUAGE_VALUE: &str = "en-GB,en;q=0.9,sv-GB;q=0.8,sv;q=0.7";

/// Build the request headers for a page fetch: browser profile, fixed
/// referer/language/accept set, and the credential cookies.
pub(crate) fn page_headers(base_url: &Url, creds: &CredentialSet) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (k, v) in header_pairs() {
        let name = HeaderName::from_lowercase(k.to_ascii_lowercase().as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static("accept"));
        if let Ok(val) = HeaderValue::from_str(v) {
            headers.insert(name, val);
        }
    }

    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    if let Ok(referer) = HeaderValue::from_str(&referer_for(base_url)) {
        headers.insert(REFERER, referer);
    }

    match HeaderValue::from_str(&creds.cookie_header()) {
        Ok(cookie) => {
            headers.insert(COOKIE, cookie);
        }
        Err(_) => tracing::warn!("credential cookie contains invalid header characters; sending none"),
    }

    headers
}

/// Site root with a trailing slash, e.g. `https://biluppgifter.se/`.
fn referer_for(base_url: &Url) -> String {
    let mut root = base_url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root.to_string()
}

fn header_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7"),
        ("Accept-Language", ACCEPT_LANGUAGE_VALUE),
        ("Upgrade-Insecure-Requests", "1"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "same-origin"),
        ("Sec-Ch-Ua", "\"Google Chrome\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\""),
        ("Sec-Ch-Ua-Mobile", "?0"),
        ("Sec-Ch-Ua-Platform", "\"Windows\""),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://biluppgifter.se").unwrap()
    }

    #[test]
    fn carries_fixed_header_set() {
        let headers = page_headers(&base(), &CredentialSet::new());
        assert_eq!(
            headers.get("referer").and_then(|v| v.to_str().ok()),
            Some("https://biluppgifter.se/")
        );
        assert_eq!(
            headers.get("accept-language").and_then(|v| v.to_str().ok()),
            Some(ACCEPT_LANGUAGE_VALUE)
        );
        assert!(headers.contains_key("accept"));
        assert!(headers.contains_key("user-agent"));
        assert_eq!(
            headers
                .get("sec-ch-ua-platform")
                .and_then(|v| v.to_str().ok()),
            Some("\"Windows\"")
        );
    }

    #[test]
    fn attaches_credential_cookies() {
        let creds = CredentialSet::from_tokens("abc", "xyz", "");
        let headers = page_headers(&base(), &creds);
        assert_eq!(
            headers.get("cookie").and_then(|v| v.to_str().ok()),
            Some("theme=dark; cf_clearance=xyz; session=abc")
        );
    }

    #[test]
    fn referer_ignores_base_path() {
        let url = Url::parse("http://127.0.0.1:8080/some/path?q=1").unwrap();
        assert_eq!(referer_for(&url), "http://127.0.0.1:8080/");
    }
}
