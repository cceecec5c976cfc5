//! Per-stage time state with synchronous change notification.
//!
//! Each independent document ("stage") tracks its own current time and
//! playback range. Entries are created lazily on first access and persist
//! for the context's lifetime. The context is an explicit object handed to
//! collaborators, never process-global state.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use primgraph_api_core::{ListenerId, Notifier};

/// Identity of an independent document.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct StageId(pub String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        StageId(id.into())
    }
}

impl From<&str> for StageId {
    fn from(s: &str) -> Self {
        StageId(s.to_string())
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current time plus playback range for one stage.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeState {
    pub current: f32,
    pub time_in: f32,
    pub time_out: f32,
}

/// Time notifications delivered to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum TimeEvent {
    CurrentTimeChanged { stage: StageId, time: f32 },
}

#[derive(Debug, Default)]
pub struct TimeContext {
    times: HashMap<StageId, TimeState>,
    notifier: Notifier<TimeEvent>,
}

impl TimeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stage's time state; missing stages read as defaults.
    pub fn state(&self, stage: &StageId) -> TimeState {
        self.times.get(stage).copied().unwrap_or_default()
    }

    fn state_mut(&mut self, stage: &StageId) -> &mut TimeState {
        self.times.entry(stage.clone()).or_default()
    }

    pub fn current_time(&self, stage: &StageId) -> f32 {
        self.state(stage).current
    }

    pub fn time_in(&self, stage: &StageId) -> f32 {
        self.state(stage).time_in
    }

    pub fn time_out(&self, stage: &StageId) -> f32 {
        self.state(stage).time_out
    }

    /// Update the stage's current time and broadcast to every listener
    /// before returning.
    pub fn set_current_time(&mut self, time: f32, stage: &StageId) {
        self.state_mut(stage).current = time;
        self.notifier.emit(&TimeEvent::CurrentTimeChanged {
            stage: stage.clone(),
            time,
        });
    }

    pub fn set_time_in(&mut self, time_in: f32, stage: &StageId) {
        self.state_mut(stage).time_in = time_in;
    }

    pub fn set_time_out(&mut self, time_out: f32, stage: &StageId) {
        self.state_mut(stage).time_out = time_out;
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TimeEvent) + 'static) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }
}
