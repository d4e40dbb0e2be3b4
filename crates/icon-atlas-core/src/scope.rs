use std::ops::{Deref, DerefMut};

/// Temporarily overrides one setting on `S` and restores it when dropped.
///
/// The guard derefs to the target so the scoped work runs through it; the original
/// value is written back on every exit path, including `?` returns and unwinding.
pub struct ScopedSetting<'a, S, T> {
    target: &'a mut S,
    original: Option<T>,
    write: fn(&mut S, T),
}

impl<'a, S, T> ScopedSetting<'a, S, T> {
    pub fn acquire(target: &'a mut S, value: T, read: fn(&S) -> T, write: fn(&mut S, T)) -> Self {
        let original = read(target);
        write(target, value);
        Self {
            target,
            original: Some(original),
            write,
        }
    }
}

impl<S, T> Deref for ScopedSetting<'_, S, T> {
    type Target = S;
    fn deref(&self) -> &S {
        self.target
    }
}

impl<S, T> DerefMut for ScopedSetting<'_, S, T> {
    fn deref_mut(&mut self) -> &mut S {
        self.target
    }
}

impl<S, T> Drop for ScopedSetting<'_, S, T> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            (self.write)(self.target, original);
        }
    }
}
