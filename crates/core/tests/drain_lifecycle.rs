//! End-to-end drain runs against the mock worker.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use strmkit_core::testing::{fixtures, MockInspector, MockWorker, RecordingProgress};
use strmkit_core::{
    AdmissionGate, DrainRunner, DrainState, ExtractionService, IngestRules, ItemOutcome, ItemQueue,
    QueueKind, TaskTrigger,
};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

fn filled_queue(kind: QueueKind, items: usize) -> Arc<ItemQueue> {
    let queue = Arc::new(ItemQueue::new(kind));
    for item in fixtures::episodes(items) {
        queue.enqueue(item);
    }
    queue
}

#[tokio::test]
async fn test_cancel_after_third_admission() {
    let queue = filled_queue(QueueKind::IntroFingerprint, 5);
    let gate = AdmissionGate::new(2).unwrap();
    let worker = Arc::new(MockWorker::new().held());
    let progress = Arc::new(RecordingProgress::new());
    let (trigger, mut follow_ups) = TaskTrigger::channel();
    let runner = Arc::new(
        DrainRunner::new(queue, gate.clone(), worker.clone())
            .with_follow_up(trigger, "detect_episode_intros"),
    );
    let cancel = CancellationToken::new();

    let run = {
        let runner = Arc::clone(&runner);
        let cancel = cancel.clone();
        let progress = progress.clone();
        tokio::spawn(async move { runner.execute(&cancel, progress).await })
    };

    // Items 1 and 2 hold both permits; item 3 waits at the gate.
    worker.wait_started(2).await;
    assert_eq!(gate.held(), 2);

    // Finishing item 1 admits item 3.
    worker.release(1);
    worker.wait_started(3).await;

    cancel.cancel();
    sleep(Duration::from_millis(20)).await;
    worker.release(2);

    let summary = timeout(Duration::from_secs(5), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(summary.state, DrainState::CancelledComplete);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.cancelled, 2);
    assert_eq!(worker.started(), vec![1, 2, 3]);

    let outcomes: Vec<&ItemOutcome> = summary.items.iter().map(|r| &r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            &ItemOutcome::Succeeded,
            &ItemOutcome::Succeeded,
            &ItemOutcome::Succeeded,
            &ItemOutcome::Cancelled,
            &ItemOutcome::Cancelled,
        ]
    );

    assert!(progress.is_monotonic());
    assert_eq!(progress.last(), Some(100.0));
    assert!(!summary.follow_up_triggered);
    assert!(follow_ups.try_recv().is_err());
    assert_eq!(gate.held(), 0);
}

#[tokio::test]
async fn test_worker_observed_cancel_is_not_a_failure() {
    let queue = filled_queue(QueueKind::IntroFingerprint, 4);
    let gate = AdmissionGate::new(2).unwrap();
    let worker = Arc::new(MockWorker::new().held().cancel_aware());
    let progress = Arc::new(RecordingProgress::new());
    let runner = Arc::new(DrainRunner::new(queue, gate.clone(), worker.clone()));
    let cancel = CancellationToken::new();

    let run = {
        let runner = Arc::clone(&runner);
        let cancel = cancel.clone();
        let progress = progress.clone();
        tokio::spawn(async move { runner.execute(&cancel, progress).await })
    };

    // Items 1 and 2 are in flight and stop early; 3 and 4 are never admitted.
    worker.wait_started(2).await;
    cancel.cancel();

    let summary = timeout(Duration::from_secs(5), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(summary.state, DrainState::CancelledComplete);
    assert_eq!(summary.cancelled, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(worker.calls(), 2);
    assert!(worker.finished().is_empty());
    assert_eq!(gate.held(), 0);
    assert!(progress.is_monotonic());
    assert_eq!(progress.last(), Some(100.0));
}

#[tokio::test]
async fn test_cancel_after_last_admission_still_completes() {
    let queue = filled_queue(QueueKind::IntroFingerprint, 2);
    let gate = AdmissionGate::new(2).unwrap();
    let worker = Arc::new(MockWorker::new().held());
    let (trigger, mut follow_ups) = TaskTrigger::channel();
    let runner = Arc::new(
        DrainRunner::new(queue, gate.clone(), worker.clone())
            .with_follow_up(trigger, "detect_episode_intros"),
    );
    let cancel = CancellationToken::new();

    let run = {
        let runner = Arc::clone(&runner);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            runner
                .execute(&cancel, Arc::new(RecordingProgress::new()))
                .await
        })
    };

    // Both items hold permits before the token fires; nothing is skipped.
    worker.wait_started(2).await;
    cancel.cancel();
    worker.release(2);

    let summary = timeout(Duration::from_secs(5), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(summary.state, DrainState::Completed);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.cancelled, 0);
    assert!(summary.follow_up_triggered);
    assert_eq!(
        follow_ups.try_recv().unwrap().task_key,
        "detect_episode_intros"
    );
}

#[tokio::test]
async fn test_shrink_withholds_until_below_new_capacity() {
    let queue = filled_queue(QueueKind::MediaInfo, 6);
    let gate = AdmissionGate::new(3).unwrap();
    let worker = Arc::new(MockWorker::new().held());
    let runner = Arc::new(DrainRunner::new(queue, gate.clone(), worker.clone()));

    let run = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            runner
                .execute(&CancellationToken::new(), Arc::new(RecordingProgress::new()))
                .await
        })
    };

    worker.wait_started(3).await;
    assert_eq!(gate.resize(1).unwrap(), 3);

    // No running job is aborted by the shrink.
    assert_eq!(worker.running(), 3);

    // Two completions pay off the shrink; nothing new is admitted.
    worker.release(2);
    sleep(Duration::from_millis(50)).await;
    assert_eq!(worker.started().len(), 3);
    assert_eq!(gate.held(), 1);

    // The third completion brings held below the new capacity.
    worker.release(1);
    worker.wait_started(4).await;
    assert_eq!(worker.running(), 1);

    worker.release(3);
    let summary = timeout(Duration::from_secs(5), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(summary.state, DrainState::Completed);
    assert_eq!(summary.succeeded, 6);
    assert!(worker.max_concurrent() <= 3);
    assert_eq!(gate.status().pending_shrink, 0);
}

#[tokio::test]
async fn test_grow_admits_waiting_items_immediately() {
    let queue = filled_queue(QueueKind::MediaInfo, 4);
    let gate = AdmissionGate::new(1).unwrap();
    let worker = Arc::new(MockWorker::new().held());
    let runner = Arc::new(DrainRunner::new(queue, gate.clone(), worker.clone()));

    let run = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            runner
                .execute(&CancellationToken::new(), Arc::new(RecordingProgress::new()))
                .await
        })
    };

    worker.wait_started(1).await;
    gate.resize(3).unwrap();

    timeout(Duration::from_secs(2), worker.wait_started(3))
        .await
        .unwrap();
    assert_eq!(worker.running(), 3);

    worker.release(4);
    let summary = timeout(Duration::from_secs(5), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(summary.succeeded, 4);
    assert_eq!(worker.max_concurrent(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_item_gets_exactly_one_outcome() {
    let total = 50;
    let queue = filled_queue(QueueKind::MediaInfo, total);
    let gate = AdmissionGate::new(4).unwrap();

    let mut worker = MockWorker::new().with_delay(Duration::from_millis(2));
    for id in (7..=total as i64).step_by(7) {
        worker = worker.fail_item(id, "corrupt container");
    }
    let worker = Arc::new(worker.panic_on_item(13));

    let progress = Arc::new(RecordingProgress::new());
    let runner = DrainRunner::new(queue.clone(), gate.clone(), worker.clone());

    let summary = runner
        .execute(&CancellationToken::new(), progress.clone())
        .await
        .unwrap();

    assert_eq!(summary.items.len(), total);
    let indices: HashSet<usize> = summary.items.iter().map(|r| r.index).collect();
    assert_eq!(indices.len(), total);
    assert_eq!(summary.processed(), total);
    assert_eq!(summary.failed, 8); // 7, 13, 14, 21, 28, 35, 42, 49
    assert_eq!(summary.succeeded, total - 8);
    assert!(worker.max_concurrent() <= 4);
    assert!(progress.is_monotonic());
    assert_eq!(progress.last(), Some(100.0));
    assert_eq!(gate.held(), 0);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_items_enqueued_during_drain_wait_for_next_run() {
    let queue = filled_queue(QueueKind::MediaInfo, 2);
    let gate = AdmissionGate::new(2).unwrap();
    let worker = Arc::new(MockWorker::new().held());
    let runner = Arc::new(DrainRunner::new(queue.clone(), gate, worker.clone()));

    let run = {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            runner
                .execute(&CancellationToken::new(), Arc::new(RecordingProgress::new()))
                .await
        })
    };

    worker.wait_started(2).await;
    queue.enqueue(fixtures::movie(99));
    worker.release(2);

    let first = run.await.unwrap().unwrap();
    assert_eq!(first.total, 2);
    assert_eq!(queue.len(), 1);

    worker.release(1);
    let second = runner
        .execute(&CancellationToken::new(), Arc::new(RecordingProgress::new()))
        .await
        .unwrap();
    assert_eq!(second.total, 1);
    assert_eq!(second.items[0].item_id, 99);
}

#[tokio::test]
async fn test_queues_share_one_gate() {
    let service = ExtractionService::new(
        2,
        IngestRules::default(),
        Arc::new(MockInspector::new()),
    )
    .unwrap();
    for item in fixtures::episodes(4) {
        service.enqueue(QueueKind::MediaInfo, item.clone());
        service.enqueue(QueueKind::IntroFingerprint, item);
    }

    let worker = Arc::new(MockWorker::new().with_delay(Duration::from_millis(10)));
    let media_info = service.drain_runner(QueueKind::MediaInfo, worker.clone());
    let intro = service.drain_runner(QueueKind::IntroFingerprint, worker.clone());

    let cancel = CancellationToken::new();
    let (a, b) = tokio::join!(
        media_info.execute(&cancel, Arc::new(RecordingProgress::new())),
        intro.execute(&cancel, Arc::new(RecordingProgress::new())),
    );

    assert_eq!(a.unwrap().succeeded, 4);
    assert_eq!(b.unwrap().succeeded, 4);
    assert!(worker.max_concurrent() <= 2);
    assert_eq!(worker.calls(), 8);
}
