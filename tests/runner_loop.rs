//! End-to-end tests of the invocation loop against a mock control endpoint.

mod support;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use funcvisor::{
    BackoffPolicy, EventKind, HttpEndpointClient, InvocationContext, JitterPolicy, RawFn,
    RetryPolicy, Runner, RunnerState, RuntimeError, RuntimeConfig,
};
use support::{MockEndpoint, Report};

fn test_config(endpoint: String, max_retries: u32) -> RuntimeConfig {
    RuntimeConfig {
        endpoint,
        request_timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_retries,
            backoff: BackoffPolicy {
                first: Duration::from_millis(50),
                max: Duration::from_millis(200),
                factor: 1.0,
                jitter: JitterPolicy::None,
            },
        },
        bus_capacity: 1024,
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

#[tokio::test]
async fn test_five_invocations_then_stop() {
    let mock = MockEndpoint::start().await;
    for i in 0..5 {
        mock.enqueue(&format!("req-{i}"), b"{}", None);
    }

    let config = test_config(mock.endpoint(), 3);
    let client = HttpEndpointClient::new(&config).unwrap();
    let mut runner = Runner::new(config, client);
    let stop = runner.stop_token();
    let mut events = runner.bus().subscribe();

    let provider_calls = Arc::new(AtomicU32::new(0));
    let calls = provider_calls.clone();
    let handler = runner
        .initialize(move |_ctx| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawFn::arc(|_payload: Bytes, _ctx: InvocationContext| async move {
                Ok(Bytes::from_static(b"\"ok\""))
            }))
        })
        .await
        .unwrap();

    let task = tokio::spawn(async move {
        let result = runner.run(handler).await;
        (result, runner)
    });

    let reports = mock.wait_for_reports(5, Duration::from_secs(10)).await;
    stop.cancel();
    let (result, runner) = task.await.unwrap();

    result.unwrap();
    assert_eq!(runner.state(), RunnerState::Stopped);
    assert_eq!(provider_calls.load(Ordering::SeqCst), 1);

    // Exactly one success per fetched invocation, reported in fetch order.
    assert_eq!(reports.len(), 5);
    for (i, report) in reports.iter().enumerate() {
        match report {
            Report::Success { request_id, payload } => {
                assert_eq!(request_id, &format!("req-{i}"));
                assert_eq!(payload, b"\"ok\"");
            }
            other => panic!("expected success report, got {other:?}"),
        }
    }

    let mut completed = 0;
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::InvocationCompleted {
            completed += 1;
        }
    }
    assert_eq!(completed, 5);
}

#[tokio::test]
async fn test_deadline_exceeded_then_loop_continues() {
    let mock = MockEndpoint::start().await;
    mock.enqueue("req-slow", b"slow", Some(now_ms() + 300));
    mock.enqueue("req-fast", b"fast", None);

    let config = test_config(mock.endpoint(), 3);
    let client = HttpEndpointClient::new(&config).unwrap();
    let mut runner = Runner::new(config, client);
    let stop = runner.stop_token();

    let handler = runner
        .initialize(|_ctx| async {
            Ok(RawFn::arc(|payload: Bytes, _ctx: InvocationContext| async move {
                if &payload[..] == b"slow" {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                Ok(Bytes::from_static(b"done"))
            }))
        })
        .await
        .unwrap();

    let task = tokio::spawn(async move {
        let result = runner.run(handler).await;
        (result, runner)
    });

    let reports = mock.wait_for_reports(2, Duration::from_secs(10)).await;
    stop.cancel();
    let (result, runner) = task.await.unwrap();

    result.unwrap();
    assert_eq!(runner.state(), RunnerState::Stopped);

    match &reports[0] {
        Report::Failure { request_id, kind } => {
            assert_eq!(request_id, "req-slow");
            assert_eq!(kind, "invocation_deadline_exceeded");
        }
        other => panic!("expected deadline failure, got {other:?}"),
    }
    match &reports[1] {
        Report::Success { request_id, .. } => assert_eq!(request_id, "req-fast"),
        other => panic!("expected success after deadline failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_retries_within_budget_recover() {
    let mock = MockEndpoint::start().await;
    mock.fail_next_fetches(3);
    let request_id = uuid::Uuid::new_v4().to_string();
    mock.enqueue(&request_id, b"{}", None);

    // Three transport errors then a valid invocation; three retries allowed.
    let config = test_config(mock.endpoint(), 3);
    let client = HttpEndpointClient::new(&config).unwrap();
    let mut runner = Runner::new(config, client);
    let stop = runner.stop_token();

    let handler = runner
        .initialize(|_ctx| async {
            Ok(RawFn::arc(|_payload: Bytes, _ctx: InvocationContext| async move {
                Ok(Bytes::from_static(b"\"ok\""))
            }))
        })
        .await
        .unwrap();

    let task = tokio::spawn(async move {
        let result = runner.run(handler).await;
        (result, runner)
    });

    let reports = mock.wait_for_reports(1, Duration::from_secs(10)).await;
    stop.cancel();
    let (result, _runner) = task.await.unwrap();

    result.unwrap();
    assert_eq!(reports[0].request_id(), Some(request_id.as_str()));
}

#[tokio::test]
async fn test_fetch_retries_exhausted_is_fatal() {
    let mock = MockEndpoint::start().await;
    mock.fail_next_fetches(3);
    mock.enqueue("req-unreached", b"{}", None);

    // Three transport errors but only two retries allowed.
    let config = test_config(mock.endpoint(), 2);
    let client = HttpEndpointClient::new(&config).unwrap();
    let mut runner = Runner::new(config, client);

    let handler = runner
        .initialize(|_ctx| async {
            Ok(RawFn::arc(|_payload: Bytes, _ctx: InvocationContext| async move {
                Ok(Bytes::new())
            }))
        })
        .await
        .unwrap();

    let err = runner.run(handler).await.unwrap_err();
    match err {
        RuntimeError::FetchExhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert_eq!(source.as_label(), "endpoint_unavailable");
        }
        other => panic!("expected FetchExhausted, got {other:?}"),
    }
    assert_eq!(runner.state(), RunnerState::Failed);
    assert!(mock.reports().is_empty());
}

#[tokio::test]
async fn test_malformed_fetch_is_fatal_without_retry() {
    let mock = MockEndpoint::start().await;
    mock.serve_malformed_next();

    let config = test_config(mock.endpoint(), 3);
    let client = HttpEndpointClient::new(&config).unwrap();
    let mut runner = Runner::new(config, client);

    let handler = runner
        .initialize(|_ctx| async {
            Ok(RawFn::arc(|_payload: Bytes, _ctx: InvocationContext| async move {
                Ok(Bytes::new())
            }))
        })
        .await
        .unwrap();

    let err = runner.run(handler).await.unwrap_err();
    match err {
        RuntimeError::FetchExhausted { attempts, source } => {
            assert_eq!(attempts, 1);
            assert_eq!(source.as_label(), "endpoint_malformed_response");
        }
        other => panic!("expected fatal malformed fetch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_report_is_fatal() {
    let mock = MockEndpoint::start().await;
    mock.reject_reports();
    mock.enqueue("req-1", b"{}", None);

    let config = test_config(mock.endpoint(), 3);
    let client = HttpEndpointClient::new(&config).unwrap();
    let mut runner = Runner::new(config, client);

    let handler = runner
        .initialize(|_ctx| async {
            Ok(RawFn::arc(|_payload: Bytes, _ctx: InvocationContext| async move {
                Ok(Bytes::from_static(b"\"ok\""))
            }))
        })
        .await
        .unwrap();

    let err = runner.run(handler).await.unwrap_err();
    match err {
        RuntimeError::Report { request_id, source } => {
            assert_eq!(request_id, "req-1");
            assert_eq!(source.as_label(), "endpoint_malformed_response");
        }
        other => panic!("expected fatal report failure, got {other:?}"),
    }
    assert_eq!(runner.state(), RunnerState::Failed);
}

#[tokio::test]
async fn test_init_failure_is_posted_and_fatal() {
    let mock = MockEndpoint::start().await;

    let config = test_config(mock.endpoint(), 3);
    let client = HttpEndpointClient::new(&config).unwrap();
    let mut runner = Runner::new(config, client);

    let err = runner
        .initialize(|_ctx| async { Err("database connection refused".into()) })
        .await
        .unwrap_err();

    match err {
        RuntimeError::Init { message } => {
            assert!(message.contains("database connection refused"));
        }
        other => panic!("expected Init error, got {other:?}"),
    }
    assert_eq!(runner.state(), RunnerState::Failed);

    let reports = mock.wait_for_reports(1, Duration::from_secs(5)).await;
    match &reports[0] {
        Report::InitError { kind, message } => {
            assert_eq!(kind, "initialization");
            assert!(message.contains("database connection refused"));
        }
        other => panic!("expected init error report, got {other:?}"),
    }
}

#[tokio::test]
async fn test_user_handler_failure_is_reported_and_loop_continues() {
    let mock = MockEndpoint::start().await;
    mock.enqueue("req-bad", b"fail", None);
    mock.enqueue("req-good", b"{}", None);

    let config = test_config(mock.endpoint(), 3);
    let client = HttpEndpointClient::new(&config).unwrap();
    let mut runner = Runner::new(config, client);
    let stop = runner.stop_token();

    let handler = runner
        .initialize(|_ctx| async {
            Ok(RawFn::arc(|payload: Bytes, _ctx: InvocationContext| async move {
                if &payload[..] == b"fail" {
                    Err(funcvisor::InvocationError::Handler {
                        message: "boom".into(),
                    })
                } else {
                    Ok(Bytes::from_static(b"\"ok\""))
                }
            }))
        })
        .await
        .unwrap();

    let task = tokio::spawn(async move {
        let result = runner.run(handler).await;
        (result, runner)
    });

    let reports = mock.wait_for_reports(2, Duration::from_secs(10)).await;
    stop.cancel();
    let (result, _runner) = task.await.unwrap();
    result.unwrap();

    match &reports[0] {
        Report::Failure { request_id, kind } => {
            assert_eq!(request_id, "req-bad");
            assert_eq!(kind, "invocation_handler");
        }
        other => panic!("expected handler failure report, got {other:?}"),
    }
    match &reports[1] {
        Report::Success { request_id, .. } => assert_eq!(request_id, "req-good"),
        other => panic!("expected success report, got {other:?}"),
    }
}
