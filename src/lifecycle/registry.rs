//! Hook registry
//!
//! One ordered list per [`HookSlot`]. Slots are fixed; only the lists grow.

use super::{HookSlot, LifecycleHook};
use serde::Serialize;
use std::sync::Arc;

/// A hook together with the label used in logs and errors
#[derive(Clone)]
pub(crate) struct RegisteredHook {
    pub(crate) name: String,
    pub(crate) hook: Arc<dyn LifecycleHook>,
}

/// Hooks registered per slot, in registration order
#[derive(Default)]
pub(crate) struct HookRegistry {
    before_init: Vec<RegisteredHook>,
    after_init: Vec<RegisteredHook>,
    before_destroy: Vec<RegisteredHook>,
    after_destroy: Vec<RegisteredHook>,
}

impl HookRegistry {
    fn slot(&self, slot: HookSlot) -> &Vec<RegisteredHook> {
        match slot {
            HookSlot::BeforeInit => &self.before_init,
            HookSlot::AfterInit => &self.after_init,
            HookSlot::BeforeDestroy => &self.before_destroy,
            HookSlot::AfterDestroy => &self.after_destroy,
        }
    }

    fn slot_mut(&mut self, slot: HookSlot) -> &mut Vec<RegisteredHook> {
        match slot {
            HookSlot::BeforeInit => &mut self.before_init,
            HookSlot::AfterInit => &mut self.after_init,
            HookSlot::BeforeDestroy => &mut self.before_destroy,
            HookSlot::AfterDestroy => &mut self.after_destroy,
        }
    }

    /// Append a hook. Unnamed hooks are labelled `<slot>#<position>`.
    pub(crate) fn push(
        &mut self,
        slot: HookSlot,
        name: Option<String>,
        hook: Arc<dyn LifecycleHook>,
    ) {
        let hooks = self.slot_mut(slot);
        let name = name.unwrap_or_else(|| format!("{}#{}", slot, hooks.len()));
        hooks.push(RegisteredHook { name, hook });
    }

    /// Copy of a slot's hooks, so they can run without holding the registry lock
    pub(crate) fn snapshot(&self, slot: HookSlot) -> Vec<RegisteredHook> {
        self.slot(slot).clone()
    }

    pub(crate) fn len(&self, slot: HookSlot) -> usize {
        self.slot(slot).len()
    }

    pub(crate) fn clear(&mut self) {
        self.before_init.clear();
        self.after_init.clear();
        self.before_destroy.clear();
        self.after_destroy.clear();
    }

    pub(crate) fn counts(&self) -> HookCounts {
        HookCounts {
            before_init: self.before_init.len(),
            after_init: self.after_init.len(),
            before_destroy: self.before_destroy.len(),
            after_destroy: self.after_destroy.len(),
        }
    }
}

/// Number of hooks registered per slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookCounts {
    pub before_init: usize,
    pub after_init: usize,
    pub before_destroy: usize,
    pub after_destroy: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::sync_hook;

    fn noop() -> Arc<dyn LifecycleHook> {
        Arc::new(sync_hook(|| Ok(())))
    }

    #[test]
    fn test_push_preserves_order_and_labels() {
        let mut registry = HookRegistry::default();
        registry.push(HookSlot::BeforeInit, None, noop());
        registry.push(HookSlot::BeforeInit, Some("Database".into()), noop());
        registry.push(HookSlot::BeforeInit, None, noop());

        let names: Vec<_> = registry
            .snapshot(HookSlot::BeforeInit)
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, vec!["beforeInit#0", "Database", "beforeInit#2"]);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut registry = HookRegistry::default();
        registry.push(HookSlot::AfterInit, None, noop());
        registry.push(HookSlot::AfterDestroy, None, noop());
        registry.push(HookSlot::AfterDestroy, None, noop());

        assert_eq!(
            registry.counts(),
            HookCounts {
                before_init: 0,
                after_init: 1,
                before_destroy: 0,
                after_destroy: 2,
            }
        );

        registry.clear();
        assert_eq!(registry.counts(), HookCounts::default());
        assert_eq!(registry.len(HookSlot::AfterDestroy), 0);
    }
}
