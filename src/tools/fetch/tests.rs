#[cfg(test)]
mod tests {
    use crate::error::Result;
    use crate::tools::credentials::{CredentialCache, CredentialSet, CredentialSource, SESSION_COOKIE};
    use crate::tools::fetch::{FetchError, FetchOptions, PageFetcher};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CredentialSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn harvest(&self) -> Result<CredentialSet> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(CredentialSet::new().with(SESSION_COOKIE, &format!("v{n}")))
        }
    }

    struct Harness {
        fetcher: PageFetcher,
        source: Arc<CountingSource>,
    }

    impl Harness {
        fn refreshes(&self) -> usize {
            self.source.calls.load(Ordering::SeqCst)
        }
    }

    fn harness(server_uri: &str, options: FetchOptions) -> Harness {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = CredentialCache::new(source.clone())
            .with_cooldown(Duration::from_secs(60))
            .with_seed(CredentialSet::new().with(SESSION_COOKIE, "seed"));
        let fetcher = PageFetcher::with_options(
            Url::parse(server_uri).unwrap(),
            Arc::new(cache),
            options,
        )
        .unwrap();
        Harness { fetcher, source }
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.map(|r| r.len()).unwrap_or(0)
    }

    #[tokio::test]
    async fn returns_body_unchanged_on_200() {
        let server = MockServer::start().await;
        let body = "<html><head><title>XBD134 - Biluppgifter.se</title></head><body>ok</body></html>";
        Mock::given(method("GET"))
            .and(path("/fordon/xbd134/"))
            .and(header("cookie", "theme=dark; session=seed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server.uri(), FetchOptions::default());
        let fetched = h.fetcher.fetch("/fordon/xbd134/").await.unwrap();

        assert_eq!(fetched, body);
        assert_eq!(h.refreshes(), 0);
    }

    #[tokio::test]
    async fn single_403_refreshes_once_and_retries_with_new_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fordon/abc123/"))
            .respond_with(ResponseTemplate::new(403))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fordon/abc123/"))
            .and(header("cookie", "theme=dark; session=v1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
            .mount(&server)
            .await;

        let h = harness(&server.uri(), FetchOptions::default());
        let body = h.fetcher.fetch("/fordon/abc123/").await.unwrap();

        assert_eq!(body, "fresh");
        assert_eq!(h.refreshes(), 1);
        assert_eq!(request_count(&server).await, 2);
    }

    #[tokio::test]
    async fn repeated_403_fails_forbidden_without_third_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let h = harness(&server.uri(), FetchOptions::default());
        let err = h.fetcher.fetch("/fordon/abc123/").await.unwrap_err();

        assert_eq!(err, FetchError::Forbidden);
        assert_eq!(h.refreshes(), 1);
        assert_eq!(request_count(&server).await, 2);
    }

    #[tokio::test]
    async fn zero_budget_fails_on_first_403() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let options = FetchOptions {
            retry_budget: 0,
            ..FetchOptions::default()
        };
        let h = harness(&server.uri(), options);
        let err = h.fetcher.fetch("/").await.unwrap_err();

        assert_eq!(err, FetchError::Forbidden);
        assert_eq!(h.refreshes(), 0);
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn other_statuses_are_upstream_errors_without_refresh() {
        for status in [404u16, 429, 500, 503] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let h = harness(&server.uri(), FetchOptions::default());
            let err = h.fetcher.fetch("/brukare/123/").await.unwrap_err();

            assert_eq!(err, FetchError::UpstreamError(status));
            assert_eq!(h.refreshes(), 0, "status {status} must not refresh");
            assert_eq!(request_count(&server).await, 1);
        }
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let options = FetchOptions {
            timeout: Duration::from_millis(200),
            ..FetchOptions::default()
        };
        let h = harness(&server.uri(), options);
        let err = h.fetcher.fetch("/").await.unwrap_err();

        assert_eq!(err, FetchError::Timeout);
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let h = harness("http://127.0.0.1:1", FetchOptions::default());
        let err = h.fetcher.fetch("/").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn keeps_query_string_of_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/brukare/42/"))
            .and(wiremock::matchers::query_param("handler", "vehicles"))
            .and(wiremock::matchers::query_param("currentPage", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table></table>"))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server.uri(), FetchOptions::default());
        let body = h
            .fetcher
            .fetch("/brukare/42/?handler=vehicles&currentPage=1")
            .await
            .unwrap();
        assert_eq!(body, "<table></table>");
    }
}
