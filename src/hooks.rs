use std::fmt;
use std::rc::Rc;

use crate::error::HookError;

/// Produces an independent copy of a stored value
pub type DuplicateFn<T> = Rc<dyn Fn(&T) -> Result<T, HookError>>;
/// Takes ownership of a value the list is done with
pub type ReleaseFn<T> = Rc<dyn Fn(T)>;
/// Decides whether a stored value matches a search key
pub type MatchFn<T, K = T> = Rc<dyn Fn(&T, &K) -> bool>;

/// The three optional value hooks of a list
///
/// `K` is the key type accepted by the match hook, the stored type by
/// default. Hooks are reference counted so that a duplicated list shares
/// them with its source. They are read at the time of each operation, so
/// replacing a hook affects values that are already stored.
pub struct Hooks<T, K: ?Sized = T> {
    pub(crate) duplicate: Option<DuplicateFn<T>>,
    pub(crate) release: Option<ReleaseFn<T>>,
    pub(crate) matches: Option<MatchFn<T, K>>,
}

impl<T> Hooks<T> {
    /// Creates an empty hook set keyed by the stored type
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, K: ?Sized> Hooks<T, K> {
    /// Installs the hook used to copy values when the list is duplicated
    pub fn with_duplicate(mut self, f: impl Fn(&T) -> Result<T, HookError> + 'static) -> Self {
        self.duplicate = Some(Rc::new(f));
        self
    }

    /// Installs the hook that receives every value the list deletes
    pub fn with_release(mut self, f: impl Fn(T) + 'static) -> Self {
        self.release = Some(Rc::new(f));
        self
    }

    /// Installs the hook used by key searches
    pub fn with_match(mut self, f: impl Fn(&T, &K) -> bool + 'static) -> Self {
        self.matches = Some(Rc::new(f));
        self
    }

    /// Hands a value to the release hook, or drops it when none is installed
    pub(crate) fn release(&self, value: T) {
        match &self.release {
            Some(release) => release(value),
            None => drop(value),
        }
    }

    /// Copies a value through the duplicate hook, falling back to `Clone`
    pub(crate) fn duplicate(&self, value: &T) -> Result<T, HookError>
    where
        T: Clone,
    {
        match &self.duplicate {
            Some(duplicate) => duplicate(value),
            None => Ok(value.clone()),
        }
    }

    /// Compares through the match hook, falling back to `PartialEq`
    pub(crate) fn matches(&self, value: &T, key: &K) -> bool
    where
        T: PartialEq<K>,
    {
        match &self.matches {
            Some(matches) => matches(value, key),
            None => value == key,
        }
    }
}

impl<T, K: ?Sized> Default for Hooks<T, K> {
    fn default() -> Self {
        Hooks {
            duplicate: None,
            release: None,
            matches: None,
        }
    }
}

impl<T, K: ?Sized> Clone for Hooks<T, K> {
    fn clone(&self) -> Self {
        Hooks {
            duplicate: self.duplicate.clone(),
            release: self.release.clone(),
            matches: self.matches.clone(),
        }
    }
}

impl<T, K: ?Sized> fmt::Debug for Hooks<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("duplicate", &self.duplicate.is_some())
            .field("release", &self.release.is_some())
            .field("matches", &self.matches.is_some())
            .finish()
    }
}
