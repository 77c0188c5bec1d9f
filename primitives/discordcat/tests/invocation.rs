//! End-to-end runs of a single invocation against a mock webhook.

use discordcat::{
    Args, Completion, ConfigStore, DispatchRequest, Error, Outcome, Report, Stream, run,
};
use httpmock::prelude::*;
use reqwest::StatusCode;
use serde_json::json;
use tempfile::{TempDir, tempdir};

fn store_with(dir: &TempDir, body: &str) -> ConfigStore {
    let store = ConfigStore::new(dir.path().join(".discordcat"));
    std::fs::write(store.path(), body).unwrap();
    store
}

fn settings_for(server: &MockServer) -> String {
    format!(
        "default_channel = \"general\"\n\n[channels]\ngeneral = \"{}\"\nops = \"{}\"\n",
        server.url("/general"),
        server.url("/ops")
    )
}

#[tokio::test]
async fn test_stdin_goes_to_default_channel() {
    let server = MockServer::start_async().await;
    let hook = server.mock(|when, then| {
        when.method(POST)
            .path("/general")
            .json_body(json!({ "content": "hello", "username": "bot" }));
        then.status(204);
    });
    let dir = tempdir().unwrap();
    let store = store_with(&dir, &settings_for(&server));

    let stdin: &[u8] = b"hello\n";
    let completion = run(&Args::default(), &store, stdin, tokio::io::sink())
        .await
        .unwrap();

    hook.assert_calls(1);
    assert_eq!(
        completion,
        Completion::Sent {
            request: DispatchRequest::message("hello", None),
            outcome: Outcome::Delivered,
        }
    );
}

#[tokio::test]
async fn test_only_one_trailing_newline_is_stripped() {
    let server = MockServer::start_async().await;
    let hook = server.mock(|when, then| {
        when.method(POST)
            .path("/ops")
            .json_body(json!({ "content": "hello\n", "username": "ci" }));
        then.status(204);
    });
    let dir = tempdir().unwrap();
    let store = store_with(&dir, &settings_for(&server));
    let args = Args {
        channel: Some("ops".to_string()),
        username: Some("ci".to_string()),
        ..Args::default()
    };

    let stdin: &[u8] = b"hello\n\n";
    run(&args, &store, stdin, tokio::io::sink()).await.unwrap();

    hook.assert_calls(1);
}

#[tokio::test]
async fn test_explicit_webhook_needs_no_settings_file() {
    let server = MockServer::start_async().await;
    let hook = server.mock(|when, then| {
        when.method(POST).path("/direct");
        then.status(204);
    });
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(".discordcat"));
    let args = Args {
        webhook_url: Some(server.url("/direct")),
        channel: Some("does-not-exist".to_string()),
        ..Args::default()
    };

    let stdin: &[u8] = b"ping";
    let completion = run(&args, &store, stdin, tokio::io::sink()).await.unwrap();

    hook.assert_calls(1);
    assert!(!completion.is_failure());
}

#[tokio::test]
async fn test_missing_settings_file_is_config_not_found() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(".discordcat"));

    let stdin: &[u8] = b"ping";
    let err = run(&Args::default(), &store, stdin, tokio::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConfigNotFound { .. }));
}

#[tokio::test]
async fn test_unknown_channel_sends_nothing() {
    let server = MockServer::start_async().await;
    let hook = server.mock(|when, then| {
        when.method(POST);
        then.status(204);
    });
    let dir = tempdir().unwrap();
    let store = store_with(&dir, &settings_for(&server));
    let args = Args {
        channel: Some("random".to_string()),
        ..Args::default()
    };

    let stdin: &[u8] = b"ping";
    let err = run(&args, &store, stdin, tokio::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownChannel(ref name) if name == "random"));
    hook.assert_calls(0);
}

#[tokio::test]
async fn test_message_answered_with_200_completes_as_failure() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/general");
        then.status(200);
    });
    let dir = tempdir().unwrap();
    let store = store_with(&dir, &settings_for(&server));

    let stdin: &[u8] = b"hello";
    let completion = run(&Args::default(), &store, stdin, tokio::io::sink())
        .await
        .unwrap();

    assert!(completion.is_failure());
    assert!(matches!(
        completion,
        Completion::Sent {
            outcome: Outcome::Rejected { status },
            ..
        } if status == StatusCode::OK
    ));
}

#[tokio::test]
async fn test_file_mode_uploads_and_ignores_stdin() {
    let server = MockServer::start_async().await;
    let hook = server.mock(|when, then| {
        when.method(POST).path("/ops").is_true(|req| {
            let body = String::from_utf8_lossy(req.body().as_ref());
            body.contains("filename=\"summary.txt\"")
                && body.contains("file body")
                && !body.contains("from stdin")
        });
        then.status(200);
    });
    let dir = tempdir().unwrap();
    let store = store_with(&dir, &settings_for(&server));
    let path = dir.path().join("out.txt");
    std::fs::write(&path, "file body").unwrap();
    let args = Args {
        channel: Some("ops".to_string()),
        file: Some(path),
        filename: Some("summary.txt".to_string()),
        ..Args::default()
    };

    let stdin: &[u8] = b"from stdin";
    let completion = run(&args, &store, stdin, tokio::io::sink()).await.unwrap();

    hook.assert_calls(1);
    assert_eq!(completion.summary().as_deref(), Some("Send file"));
}

#[tokio::test]
async fn test_file_mode_missing_file_is_error() {
    let server = MockServer::start_async().await;
    let dir = tempdir().unwrap();
    let store = store_with(&dir, &settings_for(&server));
    let args = Args {
        file: Some(dir.path().join("nope.bin")),
        ..Args::default()
    };

    let stdin: &[u8] = b"";
    let err = run(&args, &store, stdin, tokio::io::sink())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::FileRead { .. }));
}

#[tokio::test]
async fn test_configure_creates_then_merges() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(".discordcat"));
    let args = Args {
        configure: true,
        channel: Some("ignored".to_string()),
        ..Args::default()
    };

    let first: &[u8] = b"general\nhttps://example.com/a\n";
    let completion = run(&args, &store, first, tokio::io::sink()).await.unwrap();
    assert!(matches!(
        completion,
        Completion::Configured(ref s) if s.default_channel.as_deref() == Some("general")
    ));

    let second: &[u8] = b"ops\nhttps://example.com/b\n";
    run(&args, &store, second, tokio::io::sink()).await.unwrap();

    let settings = store.load().unwrap();
    assert_eq!(settings.default_channel.as_deref(), Some("general"));
    assert_eq!(settings.channels.len(), 2);
    assert_eq!(settings.channels["ops"], "https://example.com/b");
}

#[tokio::test]
async fn test_invalid_utf8_stdin_is_still_sent() {
    let server = MockServer::start_async().await;
    let hook = server.mock(|when, then| {
        when.method(POST)
            .path("/direct")
            .json_body(json!({ "content": "build caf\u{FFFD} ok", "username": "bot" }));
        then.status(204);
    });
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(".discordcat"));
    let args = Args {
        webhook_url: Some(server.url("/direct")),
        ..Args::default()
    };

    let stdin: &[u8] = b"build caf\xe9 ok\n";
    let completion = run(&args, &store, stdin, tokio::io::sink()).await.unwrap();

    hook.assert_calls(1);
    assert!(!completion.is_failure());
}

#[tokio::test]
async fn test_rejected_delivery_exits_zero_and_unknown_channel_exits_one() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/general");
        then.status(500);
    });
    let dir = tempdir().unwrap();
    let store = store_with(&dir, &settings_for(&server));

    let stdin: &[u8] = b"hello";
    let rejected = run(&Args::default(), &store, stdin, tokio::io::sink())
        .await
        .map_err(anyhow::Error::from);
    let report = Report::for_result(&rejected);
    assert_eq!(report.exit_status, 0);
    assert_eq!(
        report.line,
        Some((Stream::Stderr, "Failed send message \"hello\" (500)".to_string()))
    );

    let args = Args {
        channel: Some("random".to_string()),
        ..Args::default()
    };
    let stdin: &[u8] = b"hello";
    let unknown = run(&args, &store, stdin, tokio::io::sink())
        .await
        .map_err(anyhow::Error::from);
    let report = Report::for_result(&unknown);
    assert_eq!(report.exit_status, 1);
    assert_eq!(
        report.line,
        Some((Stream::Stderr, "Unknown channel \"random\"".to_string()))
    );
}
