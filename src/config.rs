use crate::playback::DEFAULT_FPS;

/// What to do with a remote response that arrives after a newer one was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponsePolicy {
    /// Whatever arrives last overwrites the session
    #[default]
    LastArrivalWins,
    /// Responses older than the newest applied one are dropped
    DiscardStale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbenchConfig {
    /// Base address of the segmentation service
    pub service_url: String,
    pub fps: u32,
    pub response_policy: ResponsePolicy,
}

impl WorkbenchConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            fps: DEFAULT_FPS,
            response_policy: ResponsePolicy::default(),
        }
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    pub fn with_response_policy(mut self, policy: ResponsePolicy) -> Self {
        self.response_policy = policy;
        self
    }
}
