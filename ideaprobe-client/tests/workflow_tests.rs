use ideaprobe_client::poller::{ExhaustionReason, PollConfig, PollSession, PollState};
use ideaprobe_client::{ClientError, CompletionClient, WorkflowClient, launch_and_poll};
use ideaprobe_core::domain::execution::ExecutionId;
use ideaprobe_core::dto::launch::LaunchRequest;
use ideaprobe_core::prompt::PromptSource;
use serde_json::{Value, json};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LAUNCH_PATH: &str = "/api/research/launch";
const STATUS_PATH: &str = "/api/research/status";

fn fast_config(max_attempts: u32) -> PollConfig {
    PollConfig::new(max_attempts, Duration::from_millis(10))
}

async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == STATUS_PATH)
        .count()
}

mod launch {
    use super::*;

    #[tokio::test]
    async fn test_launch_returns_execution_id_from_noisy_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LAUNCH_PATH))
            .and(body_json(json!({
                "flow_execution_variables": [
                    {"name": "target_market", "variable_value": "Maritime Logistics"},
                    {"name": "product_idea", "variable_value": "ETA optimizer"}
                ]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<hr>{\"execution_id\":\"1fcda3d7-9b2e\"}<br />"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = WorkflowClient::new(server.uri());
        let id = client
            .launch(&LaunchRequest::research("Maritime Logistics", "ETA optimizer"))
            .await
            .unwrap();

        assert_eq!(id.as_str(), "1fcda3d7-9b2e");
    }

    #[tokio::test]
    async fn test_launch_sends_session_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LAUNCH_PATH))
            .and(header("cookie", "PHPSESSID=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "exec-7"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = WorkflowClient::new(server.uri()).with_session_cookie("PHPSESSID=abc123");
        let id = client
            .launch(&LaunchRequest::simplified("Retail", "Smart shelves", None))
            .await
            .unwrap();

        assert_eq!(id.as_str(), "exec-7");
    }

    #[tokio::test]
    async fn test_launch_failure_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LAUNCH_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = WorkflowClient::new(server.uri());
        let err = client
            .launch(&LaunchRequest::research("Retail", "Smart shelves"))
            .await
            .unwrap_err();

        match err {
            ClientError::LaunchFailed(inner) => assert!(inner.is_server_error()),
            other => panic!("expected LaunchFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_launch_failure_on_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LAUNCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("Parse error: syntax error"))
            .mount(&server)
            .await;

        let client = WorkflowClient::new(server.uri());
        let err = client
            .launch(&LaunchRequest::research("Retail", "Smart shelves"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::LaunchFailed(_)));
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_launch_failure_without_identifier() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LAUNCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "queued"})))
            .mount(&server)
            .await;

        let client = WorkflowClient::new(server.uri());
        let err = client
            .launch(&LaunchRequest::research("Retail", "Smart shelves"))
            .await
            .unwrap_err();

        match err {
            ClientError::LaunchFailed(inner) => {
                assert!(matches!(*inner, ClientError::MissingField(_)))
            }
            other => panic!("expected LaunchFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_launch_failure_on_transport_error() {
        // Nothing listens on port 1
        let client = WorkflowClient::new("http://127.0.0.1:1");
        let err = client
            .launch(&LaunchRequest::research("Retail", "Smart shelves"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::LaunchFailed(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_empty_variables_are_rejected_without_request() {
        let server = MockServer::start().await;

        let client = WorkflowClient::new(server.uri());
        let err = client
            .launch(&LaunchRequest::research("", "Smart shelves"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidRequest(_)));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}

mod polling {
    use super::*;

    #[tokio::test]
    async fn test_pending_then_finished_issues_exactly_two_requests() {
        let server = MockServer::start().await;
        let finished = json!({
            "processing_status": "finished",
            "title": "Report X",
            "steps": [{"name": "Market", "output": "Large"}]
        });

        Mock::given(method("POST"))
            .and(path(STATUS_PATH))
            .and(body_json(json!({"execution_id": "1fcda3d7-9b2e"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"processing_status": "pending"})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(STATUS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(finished.clone()))
            .mount(&server)
            .await;

        let client = WorkflowClient::new(server.uri());
        let outcome = PollSession::new(ExecutionId::new("1fcda3d7-9b2e").unwrap(), fast_config(10))
            .run(&client, &CancellationToken::new())
            .await;

        assert_eq!(outcome.state(), PollState::Finished);
        assert_eq!(outcome.payload(), Some(&finished));
        assert_eq!(status_requests(&server).await, 2);
    }

    #[tokio::test]
    async fn test_always_pending_exhausts_budget() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(STATUS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{\"processing_status\":\"pending\"}<hr>"),
            )
            .mount(&server)
            .await;

        let client = WorkflowClient::new(server.uri());
        let outcome = PollSession::new(ExecutionId::new("exec-1").unwrap(), fast_config(3))
            .run(&client, &CancellationToken::new())
            .await;

        assert_eq!(outcome.state(), PollState::BudgetExhausted);
        assert_eq!(status_requests(&server).await, 3);
    }

    #[tokio::test]
    async fn test_malformed_body_counts_as_attempt_and_polling_continues() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(STATUS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<b>Warning</b>: {oops"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(STATUS_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"processing_status": "failed"})),
            )
            .mount(&server)
            .await;

        let client = WorkflowClient::new(server.uri());
        let outcome = PollSession::new(ExecutionId::new("exec-2").unwrap(), fast_config(5))
            .run(&client, &CancellationToken::new())
            .await;

        assert_eq!(outcome.state(), PollState::Failed);
        let attempts = outcome.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(!attempts[0].is_decoded());
        assert!(attempts[1].is_decoded());
        assert_eq!(status_requests(&server).await, 2);
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_reported_as_no_successful_response() {
        let client = WorkflowClient::new("http://127.0.0.1:1");
        let outcome = PollSession::new(ExecutionId::new("exec-3").unwrap(), fast_config(2))
            .run(&client, &CancellationToken::new())
            .await;

        match outcome {
            ideaprobe_client::poller::PollOutcome::BudgetExhausted { reason, attempts } => {
                assert_eq!(attempts.len(), 2);
                assert!(matches!(
                    reason,
                    ExhaustionReason::NoSuccessfulResponse { .. }
                ));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_launch_and_poll() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LAUNCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"execution_id": "e-9"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(STATUS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"processing_status": "finished", "title": "Done"})),
            )
            .mount(&server)
            .await;

        let client = WorkflowClient::new(server.uri());
        let (id, outcome) = launch_and_poll(
            &client,
            &LaunchRequest::research("Maritime Logistics", "ETA optimizer"),
            fast_config(5),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(id.as_str(), "e-9");
        assert!(outcome.is_finished());
        assert_eq!(outcome.payload().unwrap()["title"], Value::from("Done"));
    }
}

mod completion {
    use super::*;

    fn chat_reply(content: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
    }

    #[tokio::test]
    async fn test_validate_idea_strips_code_fences() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_reply("```html\n<h3>Verdict</h3><p>Promising</p>\n```")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = CompletionClient::with_base_url(server.uri(), "sk-test");
        let feedback = client
            .validate_idea("ETA optimizer", "Maritime Logistics")
            .await
            .unwrap();

        assert_eq!(feedback, "<h3>Verdict</h3><p>Promising</p>");
    }

    #[tokio::test]
    async fn test_site_builder_prompt_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Sorry, no.")))
            .mount(&server)
            .await;

        let client = CompletionClient::with_base_url(server.uri(), "sk-test");
        let extracted = client.site_builder_prompt("ETA optimizer").await.unwrap();

        assert_eq!(extracted.source, PromptSource::Fallback);
        assert!(extracted.text.contains("ETA optimizer"));
    }

    #[tokio::test]
    async fn test_interviews_use_one_persona_each() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_reply("  I would pay $20/month. ")),
            )
            .expect(3)
            .mount(&server)
            .await;

        let client = CompletionClient::with_base_url(server.uri(), "sk-test");
        let interviews = client.simulate_interviews("ETA optimizer", 3).await.unwrap();

        assert_eq!(interviews.len(), 3);
        assert_ne!(interviews[0].persona, interviews[1].persona);
        assert_eq!(interviews[2].transcript, "I would pay $20/month.");
    }

    #[tokio::test]
    async fn test_empty_choices_is_missing_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = CompletionClient::with_base_url(server.uri(), "sk-test");
        let err = client.complete("system", "user").await.unwrap_err();

        assert!(matches!(err, ClientError::MissingField(_)));
    }
}
