#[cfg(test)]
mod test {

    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use tokio::task::JoinSet;

    use crate::config::sources::Credentials;
    use crate::errors::TokenError;
    use crate::tests::common::{
        build_stack, sentinelhub_config, test_credentials, TokenEndpoint, TokenReply, CLOCK_START,
    };

    const UNUSED_API: &str = "http://127.0.0.1:1/api/v1";

    #[tokio::test]
    async fn fresh_cache_fetches_once_with_client_credentials_form() {
        let (endpoint, handle) = TokenEndpoint::start(Some(3600)).await;
        let stack = build_stack(&sentinelhub_config(UNUSED_API, &endpoint.url, test_credentials()));

        assert!(stack.tokens.cached().await.is_none());
        let token = stack.tokens.get_token().await.unwrap();

        assert_eq!(token.value, "token-1");
        assert_eq!(endpoint.hits(), 1);
        let form = endpoint.last_form().unwrap();
        assert_eq!(form.get("grant_type").map(String::as_str), Some("client_credentials"));
        assert_eq!(form.get("client_id").map(String::as_str), Some("test-client"));
        assert_eq!(form.get("client_secret").map(String::as_str), Some("test-secret"));

        handle.abort();
    }

    #[tokio::test]
    async fn calls_before_expiry_reuse_the_cached_token() {
        let (endpoint, handle) = TokenEndpoint::start(Some(3600)).await;
        let stack = build_stack(&sentinelhub_config(UNUSED_API, &endpoint.url, test_credentials()));

        let first = stack.tokens.get_token().await.unwrap();
        stack.clock.advance(60);
        let second = stack.tokens.get_token().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(endpoint.hits(), 1);
        assert_eq!(stack.metrics.token_cache_hits.get(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn expired_token_is_refetched() {
        let (endpoint, handle) = TokenEndpoint::start(Some(3600)).await;
        let stack = build_stack(&sentinelhub_config(UNUSED_API, &endpoint.url, test_credentials()));

        let first = stack.tokens.get_token().await.unwrap();
        stack.clock.advance(3600);
        let second = stack.tokens.get_token().await.unwrap();

        assert_eq!(endpoint.hits(), 2);
        assert_eq!(first.value, "token-1");
        assert_eq!(second.value, "token-2");
        assert_eq!(stack.tokens.cached().await, Some(second));

        handle.abort();
    }

    #[tokio::test]
    async fn expiry_subtracts_safety_margin_from_ttl() {
        let (endpoint, handle) = TokenEndpoint::start(Some(3600)).await;
        let stack = build_stack(&sentinelhub_config(UNUSED_API, &endpoint.url, test_credentials()));

        let token = stack.tokens.get_token().await.unwrap();
        assert_eq!(token.exp_unix_ts, CLOCK_START + 3540);

        stack.clock.set(CLOCK_START + 3539);
        assert_eq!(stack.tokens.get_token().await.unwrap().value, "token-1");
        assert_eq!(endpoint.hits(), 1);

        stack.clock.set(CLOCK_START + 3541);
        let refreshed = stack.tokens.get_token().await.unwrap();
        assert_eq!(endpoint.hits(), 2);
        assert_eq!(refreshed.exp_unix_ts, CLOCK_START + 3541 + 3540);

        handle.abort();
    }

    #[tokio::test]
    async fn missing_expires_in_assumes_one_hour() {
        let (endpoint, handle) = TokenEndpoint::start(None).await;
        let stack = build_stack(&sentinelhub_config(UNUSED_API, &endpoint.url, test_credentials()));

        let token = stack.tokens.get_token().await.unwrap();
        assert_eq!(token.exp_unix_ts, CLOCK_START + 3600 - 60);

        handle.abort();
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_network() {
        let (endpoint, handle) = TokenEndpoint::start(Some(3600)).await;

        for credentials in [
            Credentials::default(),
            Credentials { client_id: Some("id".into()), client_secret: None },
            Credentials { client_id: None, client_secret: Some("secret".into()) },
            Credentials::new("id", ""),
        ] {
            let stack = build_stack(&sentinelhub_config(UNUSED_API, &endpoint.url, credentials));
            assert!(!stack.tokens.credentials_configured());
            let result = stack.tokens.get_token().await;
            assert!(matches!(result, Err(TokenError::Configuration(_))), "{result:?}");
        }
        assert_eq!(endpoint.hits(), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_token() {
        let (endpoint, handle) = TokenEndpoint::start(Some(3600)).await;
        let stack = build_stack(&sentinelhub_config(UNUSED_API, &endpoint.url, test_credentials()));

        let first = stack.tokens.get_token().await.unwrap();
        stack.clock.advance(4000);

        endpoint.reply_with(TokenReply::Status(StatusCode::UNAUTHORIZED));
        let rejected = stack.tokens.get_token().await;
        assert!(matches!(rejected, Err(TokenError::Authentication(_))), "{rejected:?}");
        assert_eq!(stack.tokens.cached().await, Some(first.clone()));

        endpoint.reply_with(TokenReply::Body(r#"{"expires_in": 3600}"#.to_owned()));
        let malformed = stack.tokens.get_token().await;
        assert!(matches!(malformed, Err(TokenError::Authentication(_))), "{malformed:?}");
        assert_eq!(stack.tokens.cached().await, Some(first));

        endpoint.reply_with(TokenReply::Issue { expires_in: Some(3600) });
        let recovered = stack.tokens.get_token().await.unwrap();
        assert_eq!(recovered.value, "token-4");
        assert_eq!(endpoint.hits(), 4);

        handle.abort();
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_authentication_error() {
        let stack = build_stack(&sentinelhub_config(UNUSED_API, "http://127.0.0.1:1/oauth/token", test_credentials()));

        let result = stack.tokens.get_token().await;
        assert!(matches!(result, Err(TokenError::Authentication(_))), "{result:?}");
        assert!(stack.tokens.cached().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_share_one_fetch() {
        let (endpoint, handle) =
            TokenEndpoint::start_with_delay(Some(3600), Duration::from_millis(100)).await;
        let stack = build_stack(&sentinelhub_config(UNUSED_API, &endpoint.url, test_credentials()));

        let mut set = JoinSet::new();
        for _ in 0..8 {
            let tokens = Arc::clone(&stack.tokens);
            set.spawn(async move { tokens.get_token().await });
        }
        while let Some(result) = set.join_next().await {
            assert_eq!(result.unwrap().unwrap().value, "token-1");
        }
        assert_eq!(endpoint.hits(), 1);

        handle.abort();
    }
}
