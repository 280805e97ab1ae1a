//! Bounded record of recently finished tasks.

use std::collections::VecDeque;

use crate::status::StatusDescription;
use crate::task::TaskIdentity;

struct Finished {
    identity: TaskIdentity,
    instance: u64,
    description: StatusDescription,
}

/// FIFO of the last `limit` completions; `None` limit keeps nothing.
pub(super) struct History {
    limit: Option<usize>,
    entries: VecDeque<Finished>,
}

impl History {
    pub(super) fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            entries: VecDeque::with_capacity(limit.unwrap_or(0).min(256)),
        }
    }

    pub(super) fn record(&mut self, identity: TaskIdentity, instance: u64, description: StatusDescription) {
        let Some(limit) = self.limit else {
            return;
        };
        while self.entries.len() >= limit {
            self.entries.pop_front();
        }
        self.entries.push_back(Finished {
            identity,
            instance,
            description,
        });
    }

    /// Latest completion recorded for `identity`.
    pub(super) fn latest(&self, identity: &TaskIdentity) -> Option<(u64, StatusDescription)> {
        self.entries
            .iter()
            .rev()
            .find(|f| &f.identity == identity)
            .map(|f| (f.instance, f.description.clone()))
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}
