//! Background tasks: the refresh poll and the optional passive trigger.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::backend::Backend;
use crate::logging::{log, obj, Domain, Level};
use crate::refresh::Refresher;
use crate::trigger::spawn_passive_trigger;

/// Owns the spawned timers. Dropping it aborts them.
pub struct Schedule {
    handles: Vec<JoinHandle<()>>,
}

impl Schedule {
    pub fn start(
        refresher: &Refresher,
        backend: Arc<dyn Backend>,
        refresh_period: Duration,
        passive_period: Option<Duration>,
    ) -> Self {
        let mut handles = vec![refresher.start(refresh_period)];
        match passive_period {
            Some(period) => handles.push(spawn_passive_trigger(backend, period)),
            None => log(
                Level::Info,
                Domain::Schedule,
                "passive_trigger_disabled",
                obj(&[]),
            ),
        }
        Self { handles }
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    pub fn stop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for Schedule {
    fn drop(&mut self) {
        self.stop();
    }
}
