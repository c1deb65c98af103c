//! HTTP tests for the Jira client and the OpenAI reviewer against a local
//! wiremock server.

use std::time::Duration;

use jira_creator::ai::{AiError, OpenAiReviewer, QualityReviewer};
use jira_creator::jira::client::{HttpJiraClient, RetryPolicy};
use jira_creator::jira::{ApiError, ApiRequest, JiraApi};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        attempts,
        delay: Duration::ZERO,
    }
}

mod jira_client {
    use super::*;

    #[tokio::test]
    async fn put_sends_token_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/rest/api/2/issue/AAP-1"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({"fields": {"summary": "New"}})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpJiraClient::new(server.uri(), "test-token");
        let value = client
            .put("/rest/api/2/issue/AAP-1", json!({"fields": {"summary": "New"}}))
            .await
            .unwrap();

        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn query_params_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/search"))
            .and(query_param("jql", "project = AAP"))
            .and(query_param("maxResults", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"issues": []})))
            .mount(&server)
            .await;

        let client = HttpJiraClient::new(server.uri(), "t");
        let value = client
            .request(
                ApiRequest::get("/rest/api/2/search")
                    .param("jql", "project = AAP")
                    .param("maxResults", 50),
            )
            .await
            .unwrap();

        assert_eq!(value, json!({"issues": []}));
    }

    #[tokio::test]
    async fn not_found_carries_jira_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errorMessages": ["Issue does not exist or you do not have permission to see it."],
                "errors": {}
            })))
            .mount(&server)
            .await;

        let client = HttpJiraClient::new(server.uri(), "t");
        let err = client.get("/rest/api/2/issue/NOPE-1").await.unwrap_err();

        assert_eq!(
            err,
            ApiError::NotFound(
                "Issue does not exist or you do not have permission to see it.".into()
            )
        );
    }

    #[tokio::test]
    async fn unauthorized_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpJiraClient::new(server.uri(), "t").with_retry_policy(quick_retry(3));
        let err = client.get("/rest/api/2/myself").await.unwrap_err();

        assert_eq!(err, ApiError::AuthFailed("bad token".into()));
    }

    #[tokio::test]
    async fn server_error_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "AAP-1"})))
            .mount(&server)
            .await;

        let client = HttpJiraClient::new(server.uri(), "t").with_retry_policy(quick_retry(2));
        let value = client.get("/rest/api/2/issue/AAP-1").await.unwrap();

        assert_eq!(value["key"], "AAP-1");
    }

    #[tokio::test]
    async fn post_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/issue/AAP-1/comment"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpJiraClient::new(server.uri(), "t").with_retry_policy(quick_retry(3));
        let err = client
            .post("/rest/api/2/issue/AAP-1/comment", json!({"body": "hi"}))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Api {
                status: 503,
                message: "busy".into()
            }
        );
    }

    #[tokio::test]
    async fn retries_stop_at_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("gateway"))
            .expect(2)
            .mount(&server)
            .await;

        let client = HttpJiraClient::new(server.uri(), "t").with_retry_policy(quick_retry(2));
        let err = client.get("/rest/api/2/issue/AAP-1").await.unwrap_err();

        assert_eq!(
            err,
            ApiError::Api {
                status: 502,
                message: "gateway".into()
            }
        );
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = HttpJiraClient::new(server.uri(), "t");
        let err = client.get("/rest/api/2/issue/AAP-1").await.unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }
}

mod openai_reviewer {
    use super::*;

    fn endpoint(server: &MockServer) -> String {
        format!("{}/v1/chat/completions", server.uri())
    }

    #[tokio::test]
    async fn verdict_is_first_choice_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  OK \n"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reviewer = OpenAiReviewer::new("sk-test", "gpt-4o-mini", endpoint(&server));
        let verdict = reviewer
            .improve_text("Check the quality", "Add retry to the sync worker")
            .await
            .unwrap();

        assert_eq!(verdict, "OK");
    }

    #[tokio::test]
    async fn request_carries_prompt_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "prompt"},
                    {"role": "user", "content": "text"},
                ],
                "temperature": 0.8,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "OK"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reviewer = OpenAiReviewer::new("k", "gpt-4o-mini", endpoint(&server));
        reviewer.improve_text("prompt", "text").await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let reviewer = OpenAiReviewer::new("k", "gpt-4o-mini", endpoint(&server));
        let err = reviewer.improve_text("p", "t").await.unwrap_err();

        assert_eq!(
            err,
            AiError::Api {
                status: 429,
                message: "slow down".into()
            }
        );
    }

    #[tokio::test]
    async fn empty_choices_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let reviewer = OpenAiReviewer::new("k", "gpt-4o-mini", endpoint(&server));
        let err = reviewer.improve_text("p", "t").await.unwrap_err();

        assert!(matches!(err, AiError::InvalidResponse(_)));
    }
}
