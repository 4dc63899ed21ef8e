use std::time::Duration;

use article_core::Stage;
use article_engine::{EngineEvent, EngineHandle, ExportConfig, ExportDate, FailureKind, JobProgress};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn collect_until_done(handle: &EngineHandle, jobs: usize) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    let mut completed = 0;
    for _ in 0..500 {
        while let Some(event) = handle.try_recv() {
            if matches!(event, EngineEvent::JobCompleted { .. }) {
                completed += 1;
            }
            events.push(event);
        }
        if completed == jobs {
            return events;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("engine did not finish {jobs} jobs; got {events:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn batch_reports_each_job_independently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/good"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Good</title></head><body><article><p>Fine text.</p></article></body></html>",
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = ExportConfig::new(|| ExportDate::new("2024-05-01", "20240501"));
    config.options.output_root = temp.path().to_path_buf();
    let handle = EngineHandle::new(config);

    handle.enqueue(1, format!("{}/gone", server.uri()));
    handle.enqueue(2, format!("{}/good", server.uri()));
    let events = collect_until_done(&handle, 2).await;

    let outcome = |id| {
        events.iter().find_map(|event| match event {
            EngineEvent::JobCompleted { job_id, result, .. } if *job_id == id => Some(result.clone()),
            _ => None,
        })
    };
    assert_eq!(outcome(1), Some(Err(FailureKind::HttpStatus(410))));

    let good = outcome(2).unwrap().unwrap();
    assert_eq!(good.title, "Good");
    assert!(good.markdown_path.is_file());
    assert!(good.folder.starts_with(temp.path()));

    let stages: Vec<Stage> = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(JobProgress { job_id: 2, stage }) => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(stages.first(), Some(&Stage::Fetching));
    assert_eq!(stages.last(), Some(&Stage::Written));
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_engine_fails_queued_jobs_as_cancelled() {
    let temp = TempDir::new().unwrap();
    let mut config = ExportConfig::new(|| ExportDate::new("2024-05-01", "20240501"));
    config.options.output_root = temp.path().to_path_buf();
    let handle = EngineHandle::new(config);

    handle.cancel();
    handle.enqueue(9, "https://unused.example/");
    let events = collect_until_done(&handle, 1).await;

    assert!(events.iter().any(|event| matches!(
        event,
        EngineEvent::JobCompleted {
            job_id: 9,
            result: Err(FailureKind::Cancelled),
            ..
        }
    )));
}
