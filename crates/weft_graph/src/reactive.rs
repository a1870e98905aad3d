// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reactive value cells with before/after change notification.

use std::fmt;

/// A change-notification callback.
///
/// Before-change handlers are invoked with the field's *old* value still in
/// place; after-change handlers with the *new* value. Handlers receive a
/// borrow of whatever the field currently holds at that phase, nothing more.
pub type ChangeHandler<T> = Box<dyn FnMut(&T)>;

/// Token identifying one registered handler, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerToken(u64);

/// The set of change-notification subscribers for one [`ReactiveField`].
///
/// Handlers run synchronously, in registration order, on the caller's thread.
/// A panicking handler aborts the remaining sequence and unwinds to the
/// caller of `set`. Removal is by [`HandlerToken`], never by closure
/// identity.
pub struct HandlerCollection<T> {
    next_token: u64,
    before: Vec<(HandlerToken, ChangeHandler<T>)>,
    after: Vec<(HandlerToken, ChangeHandler<T>)>,
}

impl<T> HandlerCollection<T> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            next_token: 0,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    fn allocate_token(&mut self) -> HandlerToken {
        let token = HandlerToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Register a handler invoked before each write.
    pub fn add_before(&mut self, handler: ChangeHandler<T>) -> HandlerToken {
        let token = self.allocate_token();
        self.before.push((token, handler));
        token
    }

    /// Register a handler invoked after each write.
    pub fn add_after(&mut self, handler: ChangeHandler<T>) -> HandlerToken {
        let token = self.allocate_token();
        self.after.push((token, handler));
        token
    }

    /// Remove a handler by its token. Returns whether anything was removed.
    pub fn remove(&mut self, token: HandlerToken) -> bool {
        let before_len = self.before.len();
        let after_len = self.after.len();
        self.before.retain(|(t, _)| *t != token);
        self.after.retain(|(t, _)| *t != token);
        self.before.len() != before_len || self.after.len() != after_len
    }

    /// Drop every registered handler. Tokens stay unique afterwards.
    pub fn clear(&mut self) {
        self.before.clear();
        self.after.clear();
    }

    /// Number of registered handlers across both phases.
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    fn invoke_before(&mut self, value: &T) {
        for (_, handler) in &mut self.before {
            handler(value);
        }
    }

    fn invoke_after(&mut self, value: &T) {
        for (_, handler) in &mut self.after {
            handler(value);
        }
    }
}

impl<T> Default for HandlerCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for HandlerCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerCollection")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

/// A value cell that notifies subscribers around every write.
///
/// `set` runs all before-change handlers (the cell still holds the old
/// value), stores the new value, then runs all after-change handlers. Both
/// phases run even when the new value equals the old one. All of this is
/// synchronous; calling `set` on the same field from inside one of its own
/// handlers is not supported (the exclusive borrow makes it unrepresentable).
pub struct ReactiveField<T> {
    value: T,
    handlers: HandlerCollection<T>,
}

impl<T> ReactiveField<T> {
    /// Create a field holding `value` with no subscribers.
    pub fn new(value: T) -> Self {
        Self {
            value,
            handlers: HandlerCollection::new(),
        }
    }

    /// Current value. No side effects.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Write a new value, firing the full notification sequence.
    pub fn set(&mut self, value: T) {
        self.handlers.invoke_before(&self.value);
        self.value = value;
        self.handlers.invoke_after(&self.value);
    }

    /// Subscribe to the moment just before each write.
    pub fn subscribe_before(&mut self, handler: impl FnMut(&T) + 'static) -> HandlerToken {
        self.handlers.add_before(Box::new(handler))
    }

    /// Subscribe to the moment just after each write.
    pub fn subscribe_after(&mut self, handler: impl FnMut(&T) + 'static) -> HandlerToken {
        self.handlers.add_after(Box::new(handler))
    }

    /// Remove one subscription by token.
    pub fn unsubscribe(&mut self, token: HandlerToken) -> bool {
        self.handlers.remove(token)
    }

    /// Release all handlers. Idempotent; safe on a field that was never
    /// written or never subscribed to.
    pub fn dispose(&mut self) {
        self.handlers.clear();
    }

    /// The field's handler collection.
    pub fn handlers(&self) -> &HandlerCollection<T> {
        &self.handlers
    }
}

impl<T: Default> Default for ReactiveField<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveField")
            .field("value", &self.value)
            .field("handlers", &self.handlers)
            .finish()
    }
}
