use std::cell::Cell;

/// A value that remembers whether it was written to since it was last consumed.
pub struct Tracked<T> {
    value: T,
    changed: Cell<bool>,
}

impl<T> Tracked<T> {
    /// Create a new value with a changed status.
    pub fn new(value: T) -> Self {
        Self {
            value,
            changed: Cell::new(true),
        }
    }

    pub fn reset(&mut self) {
        self.changed.replace(false);
    }

    /// Returns true if the value was changed.
    pub fn changed(&self) -> bool {
        self.changed.get()
    }

    /// Call the function with a reference to the value if the value was changed and reset the
    /// status to unchanged if it was. Returns the result of the call, if there was one.
    pub fn if_changed<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        if !self.changed.get() {
            return None;
        }
        self.changed.replace(false);
        Some(f(&self.value))
    }
}

impl<T> std::ops::Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> std::ops::DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.changed.replace(true);
        &mut self.value
    }
}

impl<T: Default> Default for Tracked<T> {
    fn default() -> Self {
        Self {
            value: Default::default(),
            changed: Cell::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_changed() {
        let tracked = Tracked::new(5);
        assert_eq!(*tracked, 5);
        assert!(tracked.changed());
    }

    #[test]
    fn default_is_unchanged() {
        let tracked = Tracked::<u32>::default();
        assert!(!tracked.changed());
    }

    #[test]
    fn if_changed_consumes_the_change() {
        let tracked = Tracked::new(5);
        assert_eq!(tracked.if_changed(|value| *value * 2), Some(10));
        assert!(!tracked.changed());
        assert_eq!(tracked.if_changed(|value| *value * 2), None);
    }

    #[test]
    fn deref_mut_marks_changed() {
        let mut tracked = Tracked::new(5);
        tracked.reset();
        *tracked = 10;
        assert_eq!(*tracked, 10);
        assert!(tracked.changed());
    }

    #[test]
    fn read_access_does_not_mark_changed() {
        let mut tracked = Tracked::new(5);
        tracked.reset();
        let _ = *tracked + 1;
        assert!(!tracked.changed());
    }
}
