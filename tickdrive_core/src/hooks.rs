//! Ordered pre-tick and post-tick hooks.

use crate::controls::SessionControls;
use crate::error::SchedulerError;
use std::time::Duration;
use tickdrive_env::{EnvError, ModelRunner};

/// Everything a hook may look at or change during a tick.
pub struct HookContext<'a> {
    /// Index of the tick being run (0-based)
    pub tick: u64,
    
    /// Fixed tick period
    pub period: Duration,
    
    /// The model being advanced
    pub runner: &'a mut dyn ModelRunner,
    
    /// Session control state
    pub controls: &'a mut SessionControls,
}

/// A named callback run once per emitted tick.
pub trait TickHook {
    /// Name used in logs and errors.
    fn name(&self) -> &str;
    
    /// Runs the hook.
    fn on_tick(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EnvError>;
}

/// Adapter turning a closure into a [`TickHook`].
pub struct FnHook<F> {
    name: String,
    f: F,
}

impl<F> TickHook for FnHook<F>
where
    F: FnMut(&mut HookContext<'_>) -> Result<(), EnvError>,
{
    fn name(&self) -> &str {
        &self.name
    }
    
    fn on_tick(&mut self, ctx: &mut HookContext<'_>) -> Result<(), EnvError> {
        (self.f)(ctx)
    }
}

/// Wraps a closure as a named hook.
pub fn hook_fn<F>(name: impl Into<String>, f: F) -> FnHook<F>
where
    F: FnMut(&mut HookContext<'_>) -> Result<(), EnvError>,
{
    FnHook { name: name.into(), f }
}

/// Phase a hook is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Before the model advances
    PreTick,
    
    /// After the model advances
    PostTick,
}

/// Explicit, inspectable lists of hooks, run in registration order.
#[derive(Default)]
pub struct HookRegistry {
    pre: Vec<Box<dyn TickHook>>,
    post: Vec<Box<dyn TickHook>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Appends a pre-tick hook.
    pub fn register_pre(&mut self, hook: impl TickHook + 'static) {
        self.pre.push(Box::new(hook));
    }
    
    /// Appends a post-tick hook.
    pub fn register_post(&mut self, hook: impl TickHook + 'static) {
        self.post.push(Box::new(hook));
    }
    
    /// Names of the hooks in a phase, in invocation order.
    pub fn names(&self, phase: HookPhase) -> Vec<&str> {
        self.list(phase).iter().map(|h| h.name()).collect()
    }
    
    /// Total number of registered hooks.
    pub fn len(&self) -> usize {
        self.pre.len() + self.post.len()
    }
    
    /// True if no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    
    /// Runs every hook of a phase in order; stops at the first failure.
    pub fn run(&mut self, phase: HookPhase, ctx: &mut HookContext<'_>) -> Result<(), SchedulerError> {
        let hooks = match phase {
            HookPhase::PreTick => &mut self.pre,
            HookPhase::PostTick => &mut self.post,
        };
        for hook in hooks.iter_mut() {
            hook.on_tick(ctx).map_err(|source| SchedulerError::Hook {
                hook: hook.name().to_string(),
                source,
            })?;
        }
        Ok(())
    }
    
    fn list(&self, phase: HookPhase) -> &[Box<dyn TickHook>] {
        match phase {
            HookPhase::PreTick => &self.pre,
            HookPhase::PostTick => &self.post,
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("pre", &self.names(HookPhase::PreTick))
            .field("post", &self.names(HookPhase::PostTick))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pause::PauseController;
    use crate::rate::RealtimeRateController;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tickdrive_env::mock::MockRunner;
    
    fn controls() -> SessionControls {
        SessionControls::new(PauseController::new(false), RealtimeRateController::new(1.0).unwrap())
    }
    
    #[test]
    fn test_hooks_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HookRegistry::new();
        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            registry.register_pre(hook_fn(name, move |_| {
                log.borrow_mut().push(name);
                Ok(())
            }));
        }
        
        let mut runner = MockRunner::new();
        let mut controls = controls();
        let mut ctx = HookContext {
            tick: 0,
            period: Duration::from_millis(20),
            runner: &mut runner,
            controls: &mut controls,
        };
        registry.run(HookPhase::PreTick, &mut ctx).unwrap();
        registry.run(HookPhase::PostTick, &mut ctx).unwrap();
        
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
        assert_eq!(registry.names(HookPhase::PreTick), vec!["first", "second", "third"]);
        assert!(registry.names(HookPhase::PostTick).is_empty());
    }
    
    #[test]
    fn test_failure_stops_phase_and_names_hook() {
        let ran_after = Rc::new(RefCell::new(false));
        let mut registry = HookRegistry::new();
        registry.register_post(hook_fn("broken", |_| Err(EnvError::unreachable("gone"))));
        let flag = Rc::clone(&ran_after);
        registry.register_post(hook_fn("after", move |_| {
            *flag.borrow_mut() = true;
            Ok(())
        }));
        
        let mut runner = MockRunner::new();
        let mut controls = controls();
        let mut ctx = HookContext {
            tick: 3,
            period: Duration::from_millis(20),
            runner: &mut runner,
            controls: &mut controls,
        };
        let err = registry.run(HookPhase::PostTick, &mut ctx).unwrap_err();
        
        assert!(matches!(err, SchedulerError::Hook { ref hook, .. } if hook == "broken"));
        assert!(!*ran_after.borrow());
    }
}
