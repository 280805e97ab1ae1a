use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use super::pipeline::TaskPipeline;
use crate::{
    config::Config,
    events::{Bus, Event},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`TaskPipeline`] with optional subscribers.
pub struct PipelineBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PipelineBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive pipeline events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the pipeline.
    ///
    /// With subscribers, this spawns their workers and the listener feeding
    /// them, so it must run inside a Tokio runtime. Without subscribers no
    /// runtime is needed.
    pub fn build(self) -> TaskPipeline {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let token = CancellationToken::new();
        let pipeline = TaskPipeline::from_parts(self.cfg, bus.clone(), token.clone());

        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            let rx = bus.subscribe();
            pipeline.set_listener(tokio::spawn(subscriber_listener(rx, set, token)));
        }
        pipeline
    }
}

/// Forwards bus events to the subscriber set until cancelled, then drains
/// what is already queued and shuts the set down.
async fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Ok(ev) => set.emit_arc(Arc::new(ev)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            },
            _ = token.cancelled() => break,
        }
    }
    set.shutdown().await;
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::events::EventKind;
    use crate::task::{Task, TaskIdentity};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn subscribers_see_every_event_before_shutdown_returns() {
        let recorder = Arc::new(Recorder::default());
        let pipeline = TaskPipeline::builder(Config::default())
            .with_subscribers(vec![recorder.clone()])
            .build();

        let done: Task<u32, String> = Task::succeeded(1);
        done.identify(TaskIdentity::of(&"done"));
        pipeline.track(&done);
        done.start();

        let pending: Task<u32, String> = Task::new(|_| {});
        pipeline.track(&pending);

        pipeline.shutdown().await;

        assert_eq!(
            *recorder.0.lock(),
            vec![
                EventKind::TaskTracked,
                EventKind::TaskStarted,
                EventKind::TaskSucceeded,
                EventKind::TaskRemoved,
                EventKind::TaskTracked,
                EventKind::TaskCanceled,
                EventKind::TaskRemoved,
            ]
        );
    }
}
