//! End-to-end tests of the startup and shutdown sequence.

mod common;

use std::sync::Arc;
use std::time::Duration;

use cluster_controller::config::ConfigError;
use cluster_controller::lifecycle::{Lifecycle, Signal, StartupError};
use cluster_controller::observability::LoggingHandle;
use cluster_controller::{ControllerConfig, HttpServer, ServerError};
use common::{fake, write_config, Calls, FakeServer};
use tokio::sync::mpsc;
use tracing_test::traced_test;

const DEADLINE: Duration = Duration::from_secs(5);

#[tokio::test]
#[traced_test]
async fn test_defaults_run_until_interrupt() {
    let calls = Arc::new(Calls::default());
    let (tx, rx) = mpsc::channel(4);

    let run = Lifecycle::new(None).run(rx, fake(&calls));
    let driver = async {
        calls.up.notified().await;
        tx.send(Signal::Interrupt).await.unwrap();
    };

    let (result, ()) = tokio::time::timeout(DEADLINE, async { tokio::join!(run, driver) })
        .await
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(calls.constructed(), 1);
    assert_eq!(calls.started(), 1);
    assert_eq!(calls.stopped(), 1);
    assert!(logs_contain("Cluster controller is running"));
    assert!(logs_contain("Server started"));
    assert!(logs_contain("Bye bye, cluster controller exited"));
    assert!(!logs_contain("Failed to"));
}

#[tokio::test]
#[traced_test]
async fn test_malformed_config_never_builds_server() {
    let calls = Arc::new(Calls::default());
    let file = write_config(".yaml", "addr: [unclosed\n");
    let (_tx, rx) = mpsc::channel(4);

    let result = tokio::time::timeout(
        DEADLINE,
        Lifecycle::new(Some(file.path().to_path_buf())).run(rx, fake(&calls)),
    )
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(StartupError::Config(ConfigError::Parse { .. }))
    ));
    assert_eq!(calls.constructed(), 0);
    assert!(logs_contain("Failed to parse the config file"));
}

#[tokio::test]
#[traced_test]
async fn test_invalid_config_is_rejected() {
    let calls = Arc::new(Calls::default());
    let file = write_config(".yaml", "raft:\n  id: 0\n  heartbeat_ms: 500\n");
    let (_tx, rx) = mpsc::channel(4);

    let result = Lifecycle::new(Some(file.path().to_path_buf()))
        .run(rx, fake(&calls))
        .await;

    assert!(matches!(
        result,
        Err(StartupError::Config(ConfigError::Validation(_)))
    ));
    assert_eq!(calls.constructed(), 0);
    assert!(logs_contain("Failed to validate the config file"));
}

#[tokio::test]
#[traced_test]
async fn test_missing_config_file_is_read_error() {
    let calls = Arc::new(Calls::default());
    let dir = tempfile::tempdir().unwrap();
    let (_tx, rx) = mpsc::channel(4);

    let result = Lifecycle::new(Some(dir.path().join("absent.yaml")))
        .run(rx, fake(&calls))
        .await;

    assert!(matches!(
        result,
        Err(StartupError::Config(ConfigError::Read { .. }))
    ));
    assert!(logs_contain("Failed to read the config file"));
}

#[tokio::test]
#[traced_test]
async fn test_toml_config_is_accepted() {
    let calls = Arc::new(Calls::default());
    let file = write_config(
        ".toml",
        "cluster_name = \"orders\"\n\n[raft]\nid = 2\npeers = [\"10.0.0.1:6699\", \"10.0.0.2:6699\"]\n",
    );
    let (tx, rx) = mpsc::channel(4);

    let run = Lifecycle::new(Some(file.path().to_path_buf())).run(rx, fake(&calls));
    let driver = async {
        calls.up.notified().await;
        tx.send(Signal::Terminate).await.unwrap();
    };
    let (result, ()) = tokio::join!(run, driver);

    assert!(result.is_ok());
    assert!(logs_contain("orders"));
}

#[tokio::test]
#[traced_test]
async fn test_construct_failure_is_fatal() {
    let (_tx, rx) = mpsc::channel(4);

    let result = Lifecycle::new(None)
        .run(rx, |_| -> Result<FakeServer, ServerError> {
            Err(ServerError::other("raft storage locked"))
        })
        .await;

    assert!(matches!(result, Err(StartupError::ServerConstruct(_))));
    assert!(logs_contain("Failed to create the server"));
    assert!(logs_contain("raft storage locked"));
}

#[tokio::test]
#[traced_test]
async fn test_start_failure_skips_stop() {
    let calls = Arc::new(Calls::default());
    let (_tx, rx) = mpsc::channel(4);

    let build = {
        let calls = calls.clone();
        move |_: &ControllerConfig| -> Result<FakeServer, ServerError> {
            Ok(FakeServer::new(calls).failing_start())
        }
    };
    let result = Lifecycle::new(None).run(rx, build).await;

    assert!(matches!(result, Err(StartupError::ServerStart(_))));
    assert_eq!(calls.started(), 1);
    assert_eq!(calls.stopped(), 0);
    assert!(logs_contain("Failed to start the server"));
    assert!(!logs_contain("Bye bye"));
}

#[tokio::test]
#[traced_test]
async fn test_stop_failure_still_exits_cleanly() {
    let calls = Arc::new(Calls::default());
    let (tx, rx) = mpsc::channel(4);

    let build = {
        let calls = calls.clone();
        move |_: &ControllerConfig| -> Result<FakeServer, ServerError> {
            Ok(FakeServer::new(calls).failing_stop())
        }
    };
    let run = Lifecycle::new(None).run(rx, build);
    let driver = async {
        calls.up.notified().await;
        tx.send(Signal::Terminate).await.unwrap();
    };
    let (result, ()) = tokio::time::timeout(DEADLINE, async { tokio::join!(run, driver) })
        .await
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(calls.stopped(), 1);
    assert!(logs_contain("Failed to close the server"));
    assert!(logs_contain("raft log flush failed"));
    assert!(!logs_contain("Bye bye"));
}

#[tokio::test]
#[traced_test]
async fn test_repeated_exit_signals_stop_once() {
    let calls = Arc::new(Calls::default());
    let (tx, rx) = mpsc::channel(8);

    let run = Lifecycle::new(None).run(rx, fake(&calls));
    let driver = async {
        calls.up.notified().await;
        tx.send(Signal::Interrupt).await.unwrap();
        tx.send(Signal::Terminate).await.unwrap();
        tx.send(Signal::Interrupt).await.unwrap();
    };
    let (result, ()) = tokio::time::timeout(DEADLINE, async { tokio::join!(run, driver) })
        .await
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(calls.stopped(), 1);
}

#[tokio::test]
#[traced_test]
async fn test_reserved_signals_do_not_shut_down() {
    let calls = Arc::new(Calls::default());
    let (tx, rx) = mpsc::channel(8);

    let lifecycle = Lifecycle::new(None);
    let shutdown = lifecycle.subscribe();
    let run = lifecycle.run(rx, fake(&calls));
    let driver = async {
        calls.up.notified().await;
        for _ in 0..3 {
            tx.send(Signal::User1).await.unwrap();
            tx.send(Signal::Hangup).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!shutdown.is_triggered());
        assert_eq!(calls.stopped(), 0);

        tx.send(Signal::Terminate).await.unwrap();
    };
    let (result, ()) = tokio::time::timeout(DEADLINE, async { tokio::join!(run, driver) })
        .await
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(calls.stopped(), 1);
    assert!(logs_contain("Ignoring signal"));
}

#[tokio::test]
#[traced_test]
async fn test_signal_before_start_still_stops_server() {
    let calls = Arc::new(Calls::default());
    let (tx, rx) = mpsc::channel(4);
    tx.send(Signal::Interrupt).await.unwrap();

    let result = tokio::time::timeout(DEADLINE, Lifecycle::new(None).run(rx, fake(&calls)))
        .await
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(calls.started(), 1);
    assert_eq!(calls.stopped(), 1);
}

#[tokio::test]
#[traced_test]
async fn test_subscriber_sees_signal_driven_shutdown() {
    let calls = Arc::new(Calls::default());
    let (tx, rx) = mpsc::channel(4);

    let lifecycle = Lifecycle::new(None);
    let mut listener = lifecycle.subscribe();
    let run = lifecycle.run(rx, fake(&calls));
    let driver = async {
        calls.up.notified().await;
        assert!(!listener.is_triggered());

        tx.send(Signal::Terminate).await.unwrap();
        listener.wait().await;
    };
    let (result, ()) = tokio::time::timeout(DEADLINE, async { tokio::join!(run, driver) })
        .await
        .unwrap();

    assert!(result.is_ok());
    assert!(listener.is_triggered());
    assert_eq!(calls.stopped(), 1);
    assert!(logs_contain("Got signal to exit"));
}

#[tokio::test]
#[traced_test]
async fn test_http_server_under_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("raft");
    let file = write_config(
        ".yaml",
        &format!(
            "addr: 127.0.0.1:0\ncluster_name: e2e\nraft:\n  id: 7\n  data_dir: {}\n",
            data_dir.display()
        ),
    );
    let (tx, rx) = mpsc::channel(4);

    let run = Lifecycle::new(Some(file.path().to_path_buf()))
        .run(rx, |config| HttpServer::new(config.clone()));
    let driver = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send(Signal::Terminate).await.unwrap();
    };
    let (result, ()) = tokio::time::timeout(DEADLINE, async { tokio::join!(run, driver) })
        .await
        .unwrap();

    assert!(result.is_ok());
    assert!(data_dir.is_dir());
    assert!(logs_contain("raft node 7"));
    assert!(logs_contain("Bye bye"));
}

#[tokio::test]
async fn test_logger_switches_to_configured_file() {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("logs").join("controller.log");
    let file = write_config(
        ".yaml",
        &format!(
            "log:\n  level: info\n  filename: {}\n  rotation: never\n",
            log_file.display()
        ),
    );

    let (handle, subscriber) = LoggingHandle::build("info").unwrap();
    let _guard = tracing::subscriber::set_default(subscriber);

    let calls = Arc::new(Calls::default());
    let (tx, rx) = mpsc::channel(4);
    let run = Lifecycle::new(Some(file.path().to_path_buf()))
        .with_logging(handle)
        .run(rx, fake(&calls));
    let driver = async {
        calls.up.notified().await;
        tx.send(Signal::Interrupt).await.unwrap();
    };
    let (result, ()) = tokio::time::timeout(DEADLINE, async { tokio::join!(run, driver) })
        .await
        .unwrap();

    assert!(result.is_ok());
    let content = std::fs::read_to_string(&log_file).unwrap();
    assert!(content.contains("Server started"));
    assert!(content.contains("Bye bye, cluster controller exited"));
    assert!(!content.contains("Cluster controller is running"));
}
