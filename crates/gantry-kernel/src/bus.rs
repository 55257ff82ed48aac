//! Named-topic pub/sub registry.
//!
//! The bus is a plain data structure; the [`Kernel`](crate::kernel::Kernel)
//! wraps it in the kernel lock and performs the actual fan-out on a snapshot
//! of the subscriber list, so callbacks are free to mutate the registry
//! mid-publish.

use std::collections::HashMap;

use gantry_abi::EventCallback;

use crate::PluginId;

/// One `(topic, callback)` pairing, tagged with the plugin that created it.
///
/// Callback identity is pointer identity; the same pointer may appear any
/// number of times against the same topic.
#[derive(Clone, Copy)]
pub(crate) struct Subscription {
    pub callback: EventCallback,
    /// Plugin whose code was on the stack when the registration was made;
    /// `None` for host-owned subscriptions.
    pub owner: Option<PluginId>,
}

/// Topic → ordered subscriber list.
#[derive(Default)]
pub(crate) struct EventBus {
    topics: HashMap<String, Vec<Subscription>>,
}

impl EventBus {
    /// Appends `callback` to `topic`'s subscriber list.  Idempotence is not
    /// enforced.
    pub fn subscribe(&mut self, topic: &str, callback: EventCallback, owner: Option<PluginId>) {
        self.topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscription { callback, owner });
    }

    /// Removes every occurrence of `callback` from every topic.
    pub fn unsubscribe_callback(&mut self, callback: EventCallback) {
        let target = callback as usize;
        self.topics
            .retain(|_, subscribers| {
                subscribers.retain(|s| s.callback as usize != target);
                !subscribers.is_empty()
            });
    }

    /// Removes every subscription owned by `owner` (plugin unload scrub).
    pub fn unsubscribe_owner(&mut self, owner: PluginId) {
        self.topics.retain(|_, subscribers| {
            subscribers.retain(|s| s.owner != Some(owner));
            !subscribers.is_empty()
        });
    }

    /// The subscriber list for `topic` at this instant, in registration
    /// order.  Publication iterates this copy; mutations made by callbacks
    /// affect only subsequent publishes.
    pub fn snapshot(&self, topic: &str) -> Vec<Subscription> {
        self.topics.get(topic).cloned().unwrap_or_default()
    }

    /// Total subscriptions across all topics.
    pub fn subscription_count(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn cb_a(_: *const std::ffi::c_char, _: *const std::ffi::c_char) {}
    extern "C" fn cb_b(_: *const std::ffi::c_char, _: *const std::ffi::c_char) {}

    #[test]
    fn snapshot_preserves_registration_order() {
        let mut bus = EventBus::default();
        bus.subscribe("t", cb_a, None);
        bus.subscribe("t", cb_b, Some(1));
        let snap = bus.snapshot("t");
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].callback as usize, cb_a as usize);
        assert_eq!(snap[1].callback as usize, cb_b as usize);
    }

    #[test]
    fn multi_subscribe_is_legal_and_unsubscribe_removes_all() {
        let mut bus = EventBus::default();
        bus.subscribe("t", cb_a, None);
        bus.subscribe("t", cb_a, None);
        bus.subscribe("u", cb_a, None);
        bus.subscribe("u", cb_b, None);
        assert_eq!(bus.subscription_count(), 4);

        bus.unsubscribe_callback(cb_a);
        assert_eq!(bus.subscription_count(), 1);
        assert!(bus.snapshot("t").is_empty());
        assert_eq!(bus.snapshot("u").len(), 1);
    }

    #[test]
    fn subscribe_then_unsubscribe_restores_prior_state() {
        let mut bus = EventBus::default();
        bus.subscribe("t", cb_b, None);
        let before = bus.subscription_count();

        bus.subscribe("t", cb_a, Some(7));
        bus.unsubscribe_callback(cb_a);

        assert_eq!(bus.subscription_count(), before);
        let snap = bus.snapshot("t");
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].callback as usize, cb_b as usize);
    }

    #[test]
    fn unsubscribe_owner_scrubs_across_topics() {
        let mut bus = EventBus::default();
        bus.subscribe("t", cb_a, Some(3));
        bus.subscribe("u", cb_a, Some(3));
        bus.subscribe("u", cb_b, Some(4));

        bus.unsubscribe_owner(3);
        assert_eq!(bus.subscription_count(), 1);
        assert_eq!(bus.snapshot("u")[0].owner, Some(4));
    }

    #[test]
    fn snapshot_of_unknown_topic_is_empty() {
        let bus = EventBus::default();
        assert!(bus.snapshot("nobody").is_empty());
    }
}
