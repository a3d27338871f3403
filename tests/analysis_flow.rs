mod common;

use common::{config, AnalyzeReply, FakeApi};
use emr_intake::{
    AnalysisError, AnalysisOrchestrator, AppError, DocumentRegistry, Stage, ValidationError,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};

fn setup(api: FakeApi) -> (Arc<FakeApi>, DocumentRegistry, AnalysisOrchestrator) {
    let api = Arc::new(api);
    let registry = DocumentRegistry::new();
    registry.register("report.pdf", 2 * 1024 * 1024);
    let analyzer = AnalysisOrchestrator::new(api.clone(), &config());
    (api, registry, analyzer)
}

fn drain(events: &mut broadcast::Receiver<emr_intake::workflow::StageTransition>) -> Vec<Stage> {
    let mut stages = Vec::new();
    while let Ok(transition) = events.try_recv() {
        stages.push(transition.to);
    }
    stages
}

/// 暂停时钟下计时器按毫秒取整，允许极小的误差
fn assert_elapsed(started: Instant, expected_ms: u64) {
    let elapsed = started.elapsed();
    let expected = Duration::from_millis(expected_ms);
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(5),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

#[tokio::test]
async fn empty_registry_is_rejected_without_a_request() {
    let api = Arc::new(FakeApi::new());
    let analyzer = AnalysisOrchestrator::new(api.clone(), &config());
    let registry = DocumentRegistry::new();

    assert!(!analyzer.can_analyze(&registry));
    let err = analyzer.analyze(&registry).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::NoDocuments)));
    assert_eq!(api.analyze_calls(), 0);
    assert!(!analyzer.is_analyzing());
    assert_eq!(analyzer.snapshot().stage, Stage::Idle);
}

#[tokio::test(start_paused = true)]
async fn slow_response_walks_through_every_stage() {
    let (api, registry, analyzer) =
        setup(FakeApi::new().with_analyze_delay(Duration::from_secs(3)));
    let mut events = analyzer.subscribe_events();

    let started = Instant::now();
    let result = analyzer.analyze(&registry).await.unwrap().unwrap();

    assert_elapsed(started, 4000);
    assert_eq!(api.analyze_calls(), 1);
    assert_eq!(result.num_files_processed, 1);
    assert_eq!(
        drain(&mut events),
        vec![
            Stage::Initializing,
            Stage::Ocr,
            Stage::Extracting,
            Stage::Filling,
            Stage::Complete
        ]
    );

    let snapshot = analyzer.snapshot();
    assert_eq!(snapshot.stage, Stage::Complete);
    assert_eq!(snapshot.progress, 100);
    assert_eq!(snapshot.message, "Complete!");
    assert!(!snapshot.analyzing);
    assert_eq!(snapshot.result.as_deref(), Some(result.as_ref()));
    assert_eq!(snapshot.error, None);
}

#[tokio::test(start_paused = true)]
async fn fast_response_skips_simulated_stages() {
    let (_api, registry, analyzer) =
        setup(FakeApi::new().with_analyze_delay(Duration::from_millis(300)));
    let mut events = analyzer.subscribe_events();

    let started = Instant::now();
    let (result, at_400) = tokio::join!(analyzer.analyze(&registry), async {
        sleep(Duration::from_millis(400)).await;
        analyzer.snapshot()
    });

    assert!(result.unwrap().is_some());
    assert_elapsed(started, 1300);
    assert_eq!(at_400.stage, Stage::Filling);
    assert_eq!(at_400.progress, 90);
    assert_eq!(at_400.message, "Auto-filling EMR form...");
    assert!(at_400.result.is_none());
    assert_eq!(
        drain(&mut events),
        vec![Stage::Initializing, Stage::Filling, Stage::Complete]
    );
}

#[tokio::test(start_paused = true)]
async fn response_arriving_with_the_ocr_timer_wins() {
    let (_api, registry, analyzer) =
        setup(FakeApi::new().with_analyze_delay(Duration::from_millis(500)));
    let mut events = analyzer.subscribe_events();

    analyzer.analyze(&registry).await.unwrap().unwrap();

    let stages = drain(&mut events);
    assert!(!stages.contains(&Stage::Ocr));
    assert_eq!(stages.last(), Some(&Stage::Complete));
}

#[tokio::test(start_paused = true)]
async fn progress_never_moves_backwards_on_success() {
    for delay_ms in [0u64, 499, 501, 1999, 2000, 2001, 2600] {
        let (_api, registry, analyzer) =
            setup(FakeApi::new().with_analyze_delay(Duration::from_millis(delay_ms)));
        let mut events = analyzer.subscribe_events();

        analyzer.analyze(&registry).await.unwrap().unwrap();

        let progress: Vec<u8> = drain(&mut events).iter().map(|s| s.progress()).collect();
        assert!(
            progress.windows(2).all(|w| w[0] < w[1]),
            "delay {delay_ms}ms produced {progress:?}"
        );
        assert_eq!(progress.last(), Some(&100));
    }
}

#[tokio::test(start_paused = true)]
async fn server_failure_surfaces_detail_and_clears_after_settle() {
    let (_api, registry, analyzer) = setup(
        FakeApi::new()
            .with_analyze_delay(Duration::from_millis(700))
            .with_analyze_reply(AnalyzeReply::Reject {
                status: 500,
                message: "OCR engine unavailable".to_string(),
            }),
    );
    let mut events = analyzer.subscribe_events();

    let started = Instant::now();
    let (result, during) = tokio::join!(analyzer.analyze(&registry), async {
        sleep(Duration::from_millis(800)).await;
        analyzer.snapshot()
    });

    // 失败消息立即可见，analyzing 在一秒后才清除
    assert_eq!(during.stage, Stage::Failed);
    assert_eq!(during.progress, 0);
    assert_eq!(during.message, "");
    assert!(during.analyzing);
    assert_eq!(during.error.as_deref(), Some("OCR engine unavailable"));

    let err = result.unwrap_err();
    match &err {
        AppError::Analysis(AnalysisError::Rejected { status, message }) => {
            assert_eq!(*status, 500);
            assert_eq!(message, "OCR engine unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_elapsed(started, 1700);

    let after = analyzer.snapshot();
    assert!(!after.analyzing);
    assert!(after.result.is_none());
    assert!(analyzer.can_analyze(&registry));
    assert_eq!(
        drain(&mut events),
        vec![Stage::Initializing, Stage::Ocr, Stage::Failed]
    );
}

#[tokio::test(start_paused = true)]
async fn malformed_payload_is_an_analysis_failure() {
    let (_api, registry, analyzer) = setup(
        FakeApi::new().with_analyze_reply(AnalyzeReply::Payload(json!({ "cleaned_data": {} }))),
    );

    let err = analyzer.analyze(&registry).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Analysis(AnalysisError::Malformed { .. })
    ));

    let snapshot = analyzer.snapshot();
    assert_eq!(snapshot.stage, Stage::Failed);
    assert!(snapshot
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("malformed analysis payload")));
}

#[tokio::test(start_paused = true)]
async fn second_analyze_while_running_changes_nothing() {
    let (api, registry, analyzer) =
        setup(FakeApi::new().with_analyze_delay(Duration::from_secs(1)));

    let (first, (before, second, after)) = tokio::join!(analyzer.analyze(&registry), async {
        sleep(Duration::from_millis(600)).await;
        let before = analyzer.snapshot();
        let second = analyzer.analyze(&registry).await;
        let after = analyzer.snapshot();
        (before, second, after)
    });

    assert!(first.unwrap().is_some());
    assert!(second.unwrap().is_none());
    assert_eq!(before, after);
    assert_eq!(before.stage, Stage::Ocr);
    assert_eq!(api.analyze_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn new_run_clears_previous_result_until_it_completes() {
    let (api, registry, analyzer) = setup(FakeApi::new());

    let first = analyzer.analyze(&registry).await.unwrap().unwrap();
    assert_eq!(first.num_files_processed, 1);

    api.set_analyze_reply(AnalyzeReply::Payload(json!({ "num_files_processed": 2 })));
    let (second, during) = tokio::join!(analyzer.analyze(&registry), async {
        sleep(Duration::from_millis(100)).await;
        analyzer.snapshot()
    });

    assert!(during.result.is_none());
    assert_eq!(during.stage, Stage::Initializing);
    assert!(during.analyzing);

    let second = second.unwrap().unwrap();
    assert_eq!(second.num_files_processed, 2);
    assert!(second.cleaned_data.is_none());
    assert_eq!(
        analyzer.snapshot().result.map(|r| r.num_files_processed),
        Some(2)
    );
    assert_eq!(api.analyze_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn watchers_see_the_result_together_with_complete() {
    let (_api, registry, analyzer) = setup(FakeApi::new());
    let mut watcher = analyzer.subscribe();

    let (_, seen) = tokio::join!(analyzer.analyze(&registry), async {
        let mut seen = Vec::new();
        while watcher.changed().await.is_ok() {
            let snapshot = watcher.borrow_and_update().clone();
            let done = !snapshot.analyzing;
            seen.push(snapshot);
            if done {
                break;
            }
        }
        seen
    });

    for snapshot in &seen {
        assert_eq!(snapshot.result.is_some(), snapshot.stage == Stage::Complete);
    }
    assert!(seen.iter().any(|s| s.stage == Stage::Complete));
}
