//! Retrying JSON fetch layer for the catalog and review API

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::client::{HttpClientTrait, StatusClass};
use crate::domain::{DomainError, RetryPolicy};

/// Issues GET requests with retry, exponential backoff and typed parsing
#[derive(Debug)]
pub struct Fetcher<C: HttpClientTrait> {
    client: C,
    policy: RetryPolicy,
}

impl<C: HttpClientTrait> Fetcher<C> {
    pub fn new(client: C, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetches `endpoint` and parses the body as `T`.
    ///
    /// Transport failures, 429 and 5xx are retried up to the policy's attempt
    /// budget. Any other 4xx fails at once with `NotFound`, and a body that
    /// does not parse as `T` fails with `MalformedResponse`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, DomainError> {
        let body = self.fetch_body(endpoint, params).await?;

        serde_json::from_str(&body).map_err(|e| {
            DomainError::malformed_response(format!("Unexpected response from {}: {}", endpoint, e))
        })
    }

    async fn fetch_body(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<String, DomainError> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(endpoint, attempt, "Sending request");

            let failure = match self.client.get(endpoint, params, vec![]).await {
                Ok(response) => match response.class() {
                    StatusClass::Success => return Ok(response.body),
                    StatusClass::NotFound | StatusClass::Rejected => {
                        return Err(DomainError::not_found(format!(
                            "{} returned {}",
                            endpoint,
                            response.describe()
                        )));
                    }
                    StatusClass::Retryable => response.describe(),
                },
                Err(e) => e.to_string(),
            };

            if !self.policy.allows_another(attempt) {
                error!(endpoint, attempt, last_error = %failure, "Retries exhausted");
                return Err(DomainError::upstream_unavailable(attempt, failure));
            }

            let delay = self.policy.delay_for_retry(attempt - 1);
            warn!(
                endpoint,
                attempt,
                backoff_ms = delay.as_millis() as u64,
                error = %failure,
                "Request failed, will retry after backoff"
            );

            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::Deserialize;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::ErrorKind;
    use crate::infrastructure::http::client::mock::MockHttpClient;
    use crate::infrastructure::http::HttpClient;

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: u32,
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts)
            .with_initial_delay(1)
            .with_max_delay(5)
            .without_jitter()
    }

    fn real_fetcher(max_attempts: u32) -> Fetcher<HttpClient> {
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        Fetcher::new(client, fast_policy(max_attempts))
    }

    #[tokio::test]
    async fn test_parses_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(query_param("id", "70"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": 7 })))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = real_fetcher(3);
        let payload: Payload = fetcher
            .fetch(&format!("{}/data", server.uri()), &[("id", "70".to_string())])
            .await
            .unwrap();

        assert_eq!(payload.value, 7);
    }

    #[tokio::test]
    async fn test_always_retryable_status_uses_exactly_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = real_fetcher(3);
        let err = fetcher
            .fetch::<Payload>(&format!("{}/flaky", server.uri()), &[])
            .await
            .unwrap_err();

        match err {
            DomainError::UpstreamUnavailable { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("503"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&server)
            .await;

        let err = real_fetcher(2)
            .fetch::<Payload>(&format!("{}/limited", server.uri()), &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = real_fetcher(3)
            .fetch::<Payload>(&format!("{}/missing", server.uri()), &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_other_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let err = real_fetcher(3)
            .fetch::<Payload>(&format!("{}/forbidden", server.uri()), &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("HTTP 403"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_timeouts_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "value": 1 }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::with_timeout(Duration::from_millis(100)).unwrap();
        let fetcher = Fetcher::new(client, fast_policy(3));

        let err = fetcher
            .fetch::<Payload>(&format!("{}/slow", server.uri()), &[])
            .await
            .unwrap_err();

        match err {
            DomainError::UpstreamUnavailable { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("timed out"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sleeps_between_attempts() {
        let policy = RetryPolicy::new(3).with_initial_delay(1000).without_jitter();
        let expected = policy.delay_for_retry(0) + policy.delay_for_retry(1);
        assert_eq!(expected, Duration::from_secs(3));

        let client = MockHttpClient::new().with_response("http://api/data", 503, "busy");
        let fetcher = Fetcher::new(client, policy);

        let started = tokio::time::Instant::now();
        let err = fetcher.fetch::<Payload>("http://api/data", &[]).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(started.elapsed(), expected);
        assert_eq!(fetcher.client.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_body_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weird"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"unexpected\": true}"))
            .expect(1)
            .mount(&server)
            .await;

        let err = real_fetcher(3)
            .fetch::<Payload>(&format!("{}/weird", server.uri()), &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let client = MockHttpClient::new()
            .with_response("http://api/data", 502, "bad gateway")
            .with_json("http://api/data", serde_json::json!({ "value": 1 }));
        let fetcher = Fetcher::new(client, fast_policy(3));

        let payload: Payload = fetcher.fetch("http://api/data", &[]).await.unwrap();
        assert_eq!(payload.value, 1);
        assert_eq!(fetcher.client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried() {
        let client = MockHttpClient::new().with_transport_error("http://api/data", "connection reset");
        let fetcher = Fetcher::new(client, fast_policy(4));

        let err = fetcher.fetch::<Payload>("http://api/data", &[]).await.unwrap_err();

        match err {
            DomainError::UpstreamUnavailable { attempts, last_error } => {
                assert_eq!(attempts, 4);
                assert!(last_error.contains("connection reset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fetcher.client.calls().len(), 4);
    }
}
