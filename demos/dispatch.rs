//! # Example: Reactor dispatch
//!
//! A profile reactor loads users. Loads are tracked by the pipeline, rendered
//! by the `LogWriter` subscriber, and guarded by two intercepts:
//! - a timeout on every load;
//! - a block on user 0.
//!
//! Run with:
//! ```text
//! RUST_LOG=debug cargo run --example dispatch --features logging
//! ```

use std::{sync::Arc, time::Duration};

use taskreactor::{
    ActionError, ActionTask, CollisionPolicy, Config, InterceptFn, LogWriter, Reactor,
    ReactorEnvironment, ReactorExt, Status, Subscribe, Task, TaskPipeline, TimeoutIntercept,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Profile {
    Load { user: u32, delay_ms: u64 },
}

struct ProfileReactor {
    env: ReactorEnvironment<ProfileReactor>,
}

impl Reactor for ProfileReactor {
    type Action = Profile;
    type Output = String;

    fn environment(&self) -> &ReactorEnvironment<Self> {
        &self.env
    }

    fn task(&self, action: Profile) -> ActionTask<Self> {
        match action {
            Profile::Load { user, delay_ms } => Task::spawn(move |task| async move {
                task.progress(0.1);
                tokio::time::sleep(Duration::from_millis(delay_ms / 2)).await;
                task.progress(0.5);
                tokio::time::sleep(Duration::from_millis(delay_ms / 2)).await;
                Ok(format!("user-{user}"))
            }),
        }
    }

    fn handle_status(&self, status: &Status<String, ActionError>, action: &Profile) {
        match status {
            Status::Success(name) => println!("[reactor] {action:?} loaded {name}"),
            Status::Error(err) => println!("[reactor] {action:?} failed: {err}"),
            other => println!("[reactor] {action:?} {}", other.label()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut cfg = Config::default();
    cfg.collision = CollisionPolicy::Replace;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let pipeline = TaskPipeline::builder(cfg).with_subscribers(subs).build();

    let env = ReactorEnvironment::new()
        .with_pipeline(pipeline.clone())
        .with_intercept(TimeoutIntercept::new(Duration::from_millis(500)))
        .with_intercept(InterceptFn::new(
            |action: &Profile| matches!(action, Profile::Load { user: 0, .. }),
            |_: &Profile, _: ActionTask<ProfileReactor>| Task::custom_error("user 0 is reserved"),
        ));
    let reactor = Arc::new(ProfileReactor { env });

    let fast = reactor.dispatch(Profile::Load { user: 1, delay_ms: 100 });
    let slow = reactor.dispatch(Profile::Load { user: 2, delay_ms: 2_000 });
    let blocked = reactor.dispatch(Profile::Load { user: 0, delay_ms: 10 });

    println!("[main] fast    -> {:?}", fast.wait().await);
    println!("[main] slow    -> {:?}", slow.wait().await);
    println!("[main] blocked -> {:?}", blocked.wait().await);

    let action = Profile::Load { user: 1, delay_ms: 100 };
    println!("[main] status of {action:?}: {:?}", reactor.status_of(&action));

    pipeline.shutdown().await;
    Ok(())
}
