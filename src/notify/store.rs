//! Notification list the UI renders from.

use std::collections::VecDeque;

use super::Notification;

/// How many notifications are kept by default.
pub const DEFAULT_CAPACITY: usize = 50;

/// The only way to change a [`NotificationStore`].
#[derive(Debug, Clone)]
pub enum Action {
    Push(Notification),
}

/// Newest-first list of notifications with a fixed capacity.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NotificationStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Push(notification) => {
                if self.capacity == 0 {
                    return;
                }
                if self.items.len() == self.capacity {
                    self.items.pop_back();
                }
                self.items.push_front(notification);
            }
        }
    }

    /// Notifications, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn friend_request(from: &str) -> Notification {
        Notification::FriendRequest {
            from: from.to_string(),
        }
    }

    #[test]
    fn test_newest_first() {
        let mut store = NotificationStore::default();
        store.dispatch(Action::Push(friend_request("a")));
        store.dispatch(Action::Push(friend_request("b")));

        assert_eq!(store.len(), 2);
        assert_eq!(store.latest(), Some(&friend_request("b")));
        let order: Vec<_> = store.iter().cloned().collect();
        assert_eq!(order, vec![friend_request("b"), friend_request("a")]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut store = NotificationStore::new(2);
        for name in ["a", "b", "c"] {
            store.dispatch(Action::Push(friend_request(name)));
        }

        let order: Vec<_> = store.iter().cloned().collect();
        assert_eq!(order, vec![friend_request("c"), friend_request("b")]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut store = NotificationStore::new(0);
        store.dispatch(Action::Push(friend_request("a")));
        assert!(store.is_empty());
    }
}
