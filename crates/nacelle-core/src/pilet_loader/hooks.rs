use std::fmt;

use crate::pilet_loader::descriptor::PiletDescriptor;
use crate::pilet_loader::error::PiletSystemError;

type BeforeHook = Box<dyn Fn(&PiletDescriptor) + Send + Sync>;
type AfterHook = Box<dyn Fn(&PiletDescriptor, Option<&PiletSystemError>) + Send + Sync>;

/// Host-supplied callbacks fired around pilet lifecycle transitions.
///
/// `before_*` hooks fire before the lifecycle function is invoked; `after_*`
/// hooks fire afterwards, always — success or failure — so host-side
/// bookkeeping (telemetry, notifications) is reliable regardless of outcome.
/// Hook return values never influence loading.
#[derive(Default)]
pub struct LifecycleHooks {
    before_setup: Option<BeforeHook>,
    after_setup: Option<AfterHook>,
    before_teardown: Option<BeforeHook>,
    after_teardown: Option<AfterHook>,
}

impl LifecycleHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before_setup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PiletDescriptor) + Send + Sync + 'static,
    {
        self.before_setup = Some(Box::new(hook));
        self
    }

    pub fn on_after_setup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PiletDescriptor, Option<&PiletSystemError>) + Send + Sync + 'static,
    {
        self.after_setup = Some(Box::new(hook));
        self
    }

    pub fn on_before_teardown<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PiletDescriptor) + Send + Sync + 'static,
    {
        self.before_teardown = Some(Box::new(hook));
        self
    }

    pub fn on_after_teardown<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PiletDescriptor, Option<&PiletSystemError>) + Send + Sync + 'static,
    {
        self.after_teardown = Some(Box::new(hook));
        self
    }

    pub(crate) fn fire_before_setup(&self, descriptor: &PiletDescriptor) {
        if let Some(hook) = &self.before_setup {
            hook(descriptor);
        }
    }

    pub(crate) fn fire_after_setup(
        &self,
        descriptor: &PiletDescriptor,
        error: Option<&PiletSystemError>,
    ) {
        if let Some(hook) = &self.after_setup {
            hook(descriptor, error);
        }
    }

    pub(crate) fn fire_before_teardown(&self, descriptor: &PiletDescriptor) {
        if let Some(hook) = &self.before_teardown {
            hook(descriptor);
        }
    }

    pub(crate) fn fire_after_teardown(
        &self,
        descriptor: &PiletDescriptor,
        error: Option<&PiletSystemError>,
    ) {
        if let Some(hook) = &self.after_teardown {
            hook(descriptor, error);
        }
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("before_setup", &self.before_setup.is_some())
            .field("after_setup", &self.after_setup.is_some())
            .field("before_teardown", &self.before_teardown.is_some())
            .field("after_teardown", &self.after_teardown.is_some())
            .finish()
    }
}
