//! Selection signals scoped to one option group.
//!
//! A bus is owned by one sync session and subscribers register for a single
//! group key, so two templates mounted side by side never see each other's
//! selection changes.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSignal {
    pub group_key: String,
    /// Name of the newly selected option, `None` when the group was cleared.
    pub selected: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GroupSignal)>;

#[derive(Default)]
pub struct GroupBus {
    next_id: u64,
    listeners: HashMap<String, Vec<(SubscriptionId, Listener)>>,
}

impl GroupBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        group_key: &str,
        listener: impl FnMut(&GroupSignal) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(group_key.to_string())
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        self.listeners.retain(|_, subs| {
            let before = subs.len();
            subs.retain(|(sub_id, _)| *sub_id != id);
            removed |= subs.len() != before;
            !subs.is_empty()
        });
        removed
    }

    /// Deliver a signal to the subscribers of its group. Returns how many
    /// listeners ran.
    pub fn publish(&mut self, signal: &GroupSignal) -> usize {
        match self.listeners.get_mut(&signal.group_key) {
            Some(subs) => {
                for (_, listener) in subs.iter_mut() {
                    listener(signal);
                }
                subs.len()
            }
            None => 0,
        }
    }

    #[must_use]
    pub fn subscriber_count(&self, group_key: &str) -> usize {
        self.listeners.get(group_key).map_or(0, Vec::len)
    }
}

impl fmt::Debug for GroupBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut groups: Vec<(&str, usize)> = self
            .listeners
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        groups.sort_unstable();
        f.debug_struct("GroupBus").field("groups", &groups).finish()
    }
}
