#![allow(missing_docs)]

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use omni_repost::{
    CheckpointError, DeliveryError, DeliveryExecutor, FileCheckpoint, PartialFailurePolicy,
    PollRunner, Post, PostComposer, PostSource, RetryPolicy, RunOutcome, SendStep,
};
use tempfile::TempDir;

use support::{RecordingSleeper, ScriptedChannel};

/// Serves a fixed batch and records every `since` it was asked for.
#[derive(Default)]
struct FixedSource {
    posts: Vec<Post>,
    requested_since: std::sync::Mutex<Vec<i64>>,
    cycles_ended: AtomicUsize,
}

impl FixedSource {
    fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            ..Self::default()
        }
    }

    fn requested_since(&self) -> Vec<i64> {
        self.requested_since
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PostSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_since(&self, last_delivered_id: i64) -> Result<Vec<Post>> {
        self.requested_since
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(last_delivered_id);
        // Deliberately unsorted and including stale ids.
        Ok(self.posts.iter().rev().cloned().collect())
    }

    async fn end_cycle(&self) -> Result<()> {
        self.cycles_ended.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingSource;

#[async_trait]
impl PostSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch_since(&self, _last_delivered_id: i64) -> Result<Vec<Post>> {
        anyhow::bail!("wall.get failed: network unreachable")
    }
}

struct Fixture {
    dir: TempDir,
    checkpoint: FileCheckpoint,
}

impl Fixture {
    fn with_checkpoint(last_id: Option<i64>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let id_path = dir.path().join("last_id.txt");
        if let Some(last_id) = last_id {
            std::fs::write(&id_path, format!("{last_id}\n")).unwrap();
        }
        let checkpoint = FileCheckpoint::new(id_path, dir.path().join("last_check.txt"));
        Self { dir, checkpoint }
    }

    fn stored_id(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("last_id.txt"))
            .unwrap()
            .trim()
            .to_string()
    }

    fn last_check_written(&self) -> bool {
        self.dir.path().join("last_check.txt").exists()
    }

    fn runner(&self, source: Arc<dyn PostSource>, channel: Arc<ScriptedChannel>) -> PollRunner {
        let executor = DeliveryExecutor::with_sleeper(
            RetryPolicy::default(),
            Arc::new(RecordingSleeper::default()),
        );
        PollRunner::new(
            source,
            channel,
            PostComposer::default(),
            executor,
            self.checkpoint.clone(),
        )
    }
}

fn text_post(id: i64) -> Post {
    Post::builder(id).text(format!("post {id}")).build()
}

#[tokio::test]
async fn delivered_posts_advance_checkpoint_in_order() -> Result<()> {
    let fixture = Fixture::with_checkpoint(Some(100));
    let source = Arc::new(FixedSource::new(vec![
        text_post(99),
        text_post(101),
        text_post(102),
    ]));
    let channel = Arc::new(ScriptedChannel::default());

    let report = fixture.runner(source.clone(), channel.clone()).run_cycle().await?;

    assert_eq!(report.fetched, 2);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed_post, None);
    assert_eq!(report.checkpoint, 102);
    assert_eq!(fixture.stored_id(), "102");
    assert_eq!(
        channel.attempts(),
        vec![SendStep::text("post 101"), SendStep::text("post 102")]
    );
    assert_eq!(source.requested_since(), vec![100]);
    assert_eq!(source.cycles_ended.load(Ordering::SeqCst), 1);
    assert!(fixture.last_check_written());
    Ok(())
}

#[tokio::test]
async fn failed_post_keeps_checkpoint_and_stops_batch() -> Result<()> {
    let fixture = Fixture::with_checkpoint(Some(10));
    let source = Arc::new(FixedSource::new(vec![
        text_post(11),
        text_post(12),
        text_post(13),
    ]));
    let channel = Arc::new(ScriptedChannel::new([
        Ok(()),
        Err(DeliveryError::permanent("403 Forbidden")),
    ]));

    let report = fixture.runner(source.clone(), channel.clone()).run_cycle().await?;

    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed_post, Some(12));
    assert_eq!(report.checkpoint, 11);
    assert_eq!(fixture.stored_id(), "11");
    // Post 13 was never attempted.
    assert_eq!(channel.attempt_count(), 2);
    assert_eq!(source.cycles_ended.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn partially_delivered_post_is_redelivered_by_default() -> Result<()> {
    let fixture = Fixture::with_checkpoint(Some(10));
    let long_post = Post::builder(11).text("word ".repeat(2000)).build();
    let source = Arc::new(FixedSource::new(vec![long_post]));
    let channel = Arc::new(ScriptedChannel::new([
        Ok(()),
        Err(DeliveryError::permanent("chat not found")),
    ]));

    let report = fixture.runner(source, channel).run_cycle().await?;

    assert_eq!(report.failed_post, Some(11));
    assert_eq!(fixture.stored_id(), "10");
    Ok(())
}

#[tokio::test]
async fn advance_policy_skips_partially_delivered_post() -> Result<()> {
    let fixture = Fixture::with_checkpoint(Some(10));
    let long_post = Post::builder(11).text("word ".repeat(2000)).build();
    let source = Arc::new(FixedSource::new(vec![long_post, text_post(12)]));
    let channel = Arc::new(ScriptedChannel::new([
        Ok(()),
        Err(DeliveryError::permanent("chat not found")),
    ]));

    let report = fixture
        .runner(source, channel.clone())
        .with_partial_failure(PartialFailurePolicy::Advance)
        .run_cycle()
        .await?;

    assert_eq!(report.failed_post, Some(11));
    assert_eq!(report.checkpoint, 11);
    assert_eq!(fixture.stored_id(), "11");
    assert_eq!(channel.attempt_count(), 2);
    Ok(())
}

#[tokio::test]
async fn advance_policy_keeps_checkpoint_when_nothing_was_sent() -> Result<()> {
    let fixture = Fixture::with_checkpoint(Some(10));
    let source = Arc::new(FixedSource::new(vec![text_post(11)]));
    let channel = Arc::new(ScriptedChannel::new([Err(DeliveryError::permanent(
        "bot was kicked",
    ))]));

    let report = fixture
        .runner(source, channel)
        .with_partial_failure(PartialFailurePolicy::Advance)
        .run_cycle()
        .await?;

    assert_eq!(report.checkpoint, 10);
    assert_eq!(fixture.stored_id(), "10");
    Ok(())
}

#[tokio::test]
async fn empty_post_advances_checkpoint_without_sending() -> Result<()> {
    let fixture = Fixture::with_checkpoint(Some(1));
    let source = Arc::new(FixedSource::new(vec![Post::builder(2).text("   ").build()]));
    let channel = Arc::new(ScriptedChannel::default());

    let report = fixture.runner(source, channel.clone()).run_cycle().await?;

    assert_eq!(report.checkpoint, 2);
    assert_eq!(report.delivered, 0);
    assert_eq!(channel.attempt_count(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_checkpoint_is_fatal() {
    let fixture = Fixture::with_checkpoint(None);
    let source = Arc::new(FixedSource::new(vec![text_post(1)]));
    let channel = Arc::new(ScriptedChannel::default());

    let error = fixture
        .runner(source.clone(), channel.clone())
        .run_until(Duration::from_secs(3600), false, std::future::pending())
        .await
        .unwrap_err();

    assert!(
        error
            .chain()
            .any(|cause| matches!(
                cause.downcast_ref::<CheckpointError>(),
                Some(CheckpointError::Missing { .. })
            ))
    );
    assert!(source.requested_since().is_empty());
    assert_eq!(channel.attempt_count(), 0);
}

#[tokio::test]
async fn single_start_runs_exactly_one_cycle() -> Result<()> {
    let fixture = Fixture::with_checkpoint(Some(5));
    let source = Arc::new(FixedSource::new(vec![text_post(6)]));
    let channel = Arc::new(ScriptedChannel::default());

    let outcome = fixture
        .runner(source.clone(), channel)
        .run_until(Duration::from_secs(3600), true, std::future::pending())
        .await?;

    assert_eq!(outcome, RunOutcome::Completed { cycles: 1 });
    assert_eq!(source.requested_since(), vec![5]);
    assert_eq!(fixture.stored_id(), "6");
    Ok(())
}

#[tokio::test]
async fn fetch_errors_do_not_stop_the_loop() -> Result<()> {
    let fixture = Fixture::with_checkpoint(Some(5));
    let channel = Arc::new(ScriptedChannel::default());
    let runner = fixture.runner(Arc::new(FailingSource), channel);

    assert!(runner.run_cycle().await.is_err());
    assert!(fixture.last_check_written());

    let outcome = runner
        .run_until(Duration::from_millis(10), false, async {
            tokio::time::sleep(Duration::from_millis(50)).await;
        })
        .await?;

    assert!(matches!(outcome, RunOutcome::Interrupted { cycles } if cycles >= 1));
    assert_eq!(fixture.stored_id(), "5");
    Ok(())
}
