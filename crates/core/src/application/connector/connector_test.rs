//! Unit tests for BridgeConnector against the mock runner

use super::*;
use crate::application::delivery::ReplyReceiver;
use crate::domain::{InboundMessage, InvocationError};
use crate::port::id_provider::SequentialIdProvider;
use crate::port::process_runner::mocks::{MockBehavior, MockProcessRunner};
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

struct Fixture {
    connector: BridgeConnector,
    runner: Arc<MockProcessRunner>,
    replies: ReplyReceiver,
    reports: mpsc::UnboundedReceiver<InvocationReport>,
}

fn fixture(runner: MockProcessRunner) -> Fixture {
    let runner = Arc::new(runner);
    let (queue, replies) = reply_channel();
    let (report_tx, reports) = mpsc::unbounded_channel();
    let observer: Arc<dyn OutcomeObserver> = Arc::new(move |report: &InvocationReport| {
        let _ = report_tx.send(report.clone());
    });

    let connector = BridgeConnector::new(
        Arc::new(CapabilitySet::new("u1", "/s.py")),
        runner.clone(),
        queue,
    )
    .with_observer(observer)
    .with_id_provider(Arc::new(SequentialIdProvider::default()));

    Fixture {
        connector,
        runner,
        replies,
        reports,
    }
}

async fn next_report(reports: &mut mpsc::UnboundedReceiver<InvocationReport>) -> InvocationReport {
    timeout(WAIT, reports.recv())
        .await
        .expect("report timed out")
        .expect("observer channel closed")
}

#[tokio::test]
async fn test_echo_reply_is_delivered_once() {
    let mut f = fixture(MockProcessRunner::new_echo());

    f.connector.user_says(OutboundMessage::new("hello"));

    let reply = timeout(WAIT, f.replies.recv()).await.unwrap().unwrap();
    assert_eq!(reply, InboundMessage::new("hello"));

    f.connector.wait_idle().await;
    assert_eq!(f.replies.try_recv(), None);
    assert_eq!(f.runner.call_count(), 1);
}

#[tokio::test]
async fn test_default_command_and_trimmed_reply() {
    let mut f = fixture(MockProcessRunner::new_reply("Hi there\n"));

    f.connector.user_says(OutboundMessage::new("hello"));

    let report = next_report(&mut f.reports).await;
    assert_eq!(report.outcome, InvocationOutcome::Replied(InboundMessage::new("Hi there")));
    assert_eq!(f.replies.try_recv(), Some(InboundMessage::new("Hi there")));

    let requests = f.runner.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].program, "python");
    assert_eq!(
        requests[0].args,
        vec!["manage.py", "send_cli_message", "--", "u1", "/s.py", "hello"]
    );
    assert_eq!(requests[0].timeout, None);
}

#[tokio::test]
async fn test_nonzero_exit_delivers_nothing() {
    let mut f = fixture(MockProcessRunner::new(MockBehavior::Output {
        exit_code: Some(1),
        stdout: "ignored".to_string(),
        stderr: String::new(),
    }));

    f.connector.user_says(OutboundMessage::new("hello"));

    let report = next_report(&mut f.reports).await;
    assert_eq!(
        report.outcome,
        InvocationOutcome::Failed(FailureReason::Process(InvocationError::NonZeroExit { code: 1 }))
    );
    f.connector.wait_idle().await;
    assert_eq!(f.replies.try_recv(), None);
}

#[tokio::test]
async fn test_spawn_failure_delivers_nothing() {
    let mut f = fixture(MockProcessRunner::new_fail(InvocationError::SpawnFailed(
        "No such file or directory".to_string(),
    )));

    f.connector.user_says(OutboundMessage::new("hello"));

    let report = next_report(&mut f.reports).await;
    assert!(matches!(
        report.outcome,
        InvocationOutcome::Failed(FailureReason::Process(InvocationError::SpawnFailed(_)))
    ));
    assert_eq!(f.replies.try_recv(), None);
}

#[tokio::test]
async fn test_stderr_suppresses_valid_stdout() {
    let mut f = fixture(MockProcessRunner::new(MockBehavior::Output {
        exit_code: Some(0),
        stdout: "a perfectly good reply\n".to_string(),
        stderr: "warning: something\n".to_string(),
    }));

    f.connector.user_says(OutboundMessage::new("hello"));

    let report = next_report(&mut f.reports).await;
    assert_eq!(
        report.outcome,
        InvocationOutcome::Failed(FailureReason::Stderr("warning: something\n".to_string()))
    );
    assert_eq!(f.replies.try_recv(), None);
}

#[tokio::test]
async fn test_multiline_stdout_is_delivered_whole() {
    let mut f = fixture(MockProcessRunner::new_reply("Welcome!\nWhat is your name?\n"));

    f.connector.user_says(OutboundMessage::new("start"));

    let reply = timeout(WAIT, f.replies.recv()).await.unwrap().unwrap();
    assert_eq!(reply.text(), "Welcome!\nWhat is your name?");
}

#[tokio::test]
async fn test_empty_stdout_is_delivered_as_empty_reply() {
    let mut f = fixture(MockProcessRunner::new_reply(""));

    f.connector.user_says(OutboundMessage::new("..."));

    let reply = timeout(WAIT, f.replies.recv()).await.unwrap().unwrap();
    assert_eq!(reply.text(), "");
}

#[tokio::test]
async fn test_user_says_returns_before_process_completes() {
    let mut f = fixture(MockProcessRunner::new(MockBehavior::Hang));

    f.connector.user_says(OutboundMessage::new("hello"));
    assert_eq!(f.connector.in_flight(), 1);

    // Without a timeout a hung process keeps its cycle pending forever
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(f.connector.in_flight(), 1);
    assert!(timeout(Duration::from_millis(50), f.connector.wait_idle()).await.is_err());
    assert!(f.reports.try_recv().is_err());
    assert_eq!(f.replies.try_recv(), None);
}

#[tokio::test]
async fn test_timeout_and_command_are_forwarded() {
    let f = fixture(MockProcessRunner::new_echo());
    let connector = f
        .connector
        .with_command(
            DialogCommand::manage_py("python3", "/srv/app/manage.py").with_working_dir("/srv/app"),
        )
        .with_timeout(Some(Duration::from_secs(3)));
    let caps = connector.capabilities().clone();
    assert_eq!(caps.user_id, "u1");

    connector.user_says(OutboundMessage::new("hello"));
    connector.wait_idle().await;

    let request = &f.runner.requests()[0];
    assert_eq!(request.program, "python3");
    assert_eq!(request.args[0], "/srv/app/manage.py");
    assert_eq!(request.working_dir, Some(std::path::PathBuf::from("/srv/app")));
    assert_eq!(request.timeout, Some(Duration::from_secs(3)));
}

#[tokio::test]
async fn test_reports_carry_invocation_ids() {
    let mut f = fixture(MockProcessRunner::new_echo());

    f.connector.user_says(OutboundMessage::new("one"));
    f.connector.wait_idle().await;
    f.connector.user_says(OutboundMessage::new("two"));
    f.connector.wait_idle().await;

    let first = next_report(&mut f.reports).await;
    let second = next_report(&mut f.reports).await;
    assert_eq!(first.invocation_id, "inv-1");
    assert_eq!(second.invocation_id, "inv-2");
    assert_eq!(second.outcome.reply().map(InboundMessage::text), Some("two"));
}

#[tokio::test]
async fn test_closed_queue_does_not_break_the_cycle() {
    let Fixture {
        connector,
        replies,
        mut reports,
        ..
    } = fixture(MockProcessRunner::new_echo());
    drop(replies);

    connector.user_says(OutboundMessage::new("hello"));

    let report = next_report(&mut reports).await;
    assert!(report.outcome.is_replied());
    connector.wait_idle().await;
    assert_eq!(connector.in_flight(), 0);
}

#[tokio::test]
async fn test_callback_receives_replies_through_dispatcher() {
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let sink: Arc<dyn ReplySink> = Arc::new(move |message: InboundMessage| {
        let _ = seen_tx.send(message);
    });

    let runner = Arc::new(MockProcessRunner::new_echo());
    let (connector, dispatcher) = BridgeConnector::with_callback(
        Arc::new(CapabilitySet::new("u1", "/s.py")),
        runner,
        sink,
    );

    connector.user_says(OutboundMessage::new("ping"));
    connector.wait_idle().await;
    drop(connector);

    let delivered = timeout(WAIT, dispatcher).await.unwrap().unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(seen_rx.recv().await, Some(InboundMessage::new("ping")));
}
