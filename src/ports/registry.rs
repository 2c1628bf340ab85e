//! # Registry Port
//!
//! Trait for enumerating the known devices.
//!
//! The registry is the source of truth for which devices exist. It lists
//! them page by page: each page carries an optional continuation token, and
//! the listing is complete once a page comes back without one.
//!
//! Implemented by registry adapters (Memory, HTTP, etc.)

use std::collections::{BTreeSet, HashSet};

use crate::core::DeviceId;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// One page of a device listing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DevicePage {
    /// Devices on this page
    pub devices: Vec<DeviceId>,

    /// Token for the next page, `None` on the last one
    pub next_token: Option<String>,
}

impl DevicePage {
    pub fn new(devices: Vec<DeviceId>, next_token: Option<String>) -> Self {
        Self {
            devices,
            next_token,
        }
    }

    /// A page with no continuation
    pub fn last(devices: Vec<DeviceId>) -> Self {
        Self::new(devices, None)
    }
}

/// Errors that can occur while listing devices
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Registry could not be reached
    Connection(String),

    /// Registry answered with an error
    Request(String),

    /// A page could not be decoded
    MalformedPage(String),

    /// The registry handed out a continuation token twice
    RepeatedToken(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Connection(msg) => write!(f, "Registry connection error: {}", msg),
            RegistryError::Request(msg) => write!(f, "Registry request failed: {}", msg),
            RegistryError::MalformedPage(msg) => write!(f, "Malformed registry page: {}", msg),
            RegistryError::RepeatedToken(token) => {
                write!(f, "Registry repeated continuation token '{}'", token)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Trait for enumerating registered devices
///
/// Registry adapters implement `list_page`; the full enumeration comes for free.
pub trait DeviceRegistry: Send + Sync {
    /// Fetch one page of the listing
    ///
    /// `token` is `None` for the first page, then the previous page's `next_token`.
    fn list_page(&self, token: Option<&str>) -> RegistryResult<DevicePage>;

    /// Enumerate every registered device
    ///
    /// Follows continuation tokens until none remains. Duplicates across
    /// pages collapse; the result is ordered by id.
    fn list_all(&self) -> RegistryResult<BTreeSet<DeviceId>> {
        let mut devices = BTreeSet::new();
        for page in Pages::new(self) {
            devices.extend(page?.devices);
        }
        Ok(devices)
    }
}

impl<T: DeviceRegistry + ?Sized> DeviceRegistry for Box<T> {
    fn list_page(&self, token: Option<&str>) -> RegistryResult<DevicePage> {
        (**self).list_page(token)
    }
}

impl<T: DeviceRegistry + ?Sized> DeviceRegistry for &T {
    fn list_page(&self, token: Option<&str>) -> RegistryResult<DevicePage> {
        (**self).list_page(token)
    }
}

/// Lazy iterator over the pages of a registry listing
///
/// Each `Pages` starts from the first page, so a listing can be restarted by
/// creating a new one. Iteration stops after the last page or the first error.
pub struct Pages<'a, R: ?Sized> {
    registry: &'a R,
    token: Option<String>,
    seen: HashSet<String>,
    done: bool,
}

impl<'a, R: DeviceRegistry + ?Sized> Pages<'a, R> {
    pub fn new(registry: &'a R) -> Self {
        Self {
            registry,
            token: None,
            seen: HashSet::new(),
            done: false,
        }
    }
}

impl<'a, R: DeviceRegistry + ?Sized> Iterator for Pages<'a, R> {
    type Item = RegistryResult<DevicePage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut page = match self.registry.list_page(self.token.as_deref()) {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        // An empty token means "no more pages" for some backends
        match page.next_token.take().filter(|t| !t.is_empty()) {
            Some(token) => {
                if !self.seen.insert(token.clone()) {
                    self.done = true;
                    return Some(Err(RegistryError::RepeatedToken(token)));
                }
                page.next_token = Some(token.clone());
                self.token = Some(token);
            }
            None => self.done = true,
        }

        Some(Ok(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id(s: &str) -> DeviceId {
        DeviceId::new(s).unwrap()
    }

    /// Three fixed pages, counting requests
    struct ThreePages {
        calls: AtomicUsize,
    }

    impl DeviceRegistry for ThreePages {
        fn list_page(&self, token: Option<&str>) -> RegistryResult<DevicePage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match token {
                None => Ok(DevicePage::new(vec![id("c"), id("a")], Some("p2".into()))),
                Some("p2") => Ok(DevicePage::new(vec![], Some("p3".into()))),
                Some("p3") => Ok(DevicePage::new(vec![id("b"), id("a")], None)),
                Some(other) => Err(RegistryError::Request(format!("bad token {}", other))),
            }
        }
    }

    struct Looping;

    impl DeviceRegistry for Looping {
        fn list_page(&self, _token: Option<&str>) -> RegistryResult<DevicePage> {
            Ok(DevicePage::new(vec![id("x")], Some("again".into())))
        }
    }

    struct Failing;

    impl DeviceRegistry for Failing {
        fn list_page(&self, token: Option<&str>) -> RegistryResult<DevicePage> {
            match token {
                None => Ok(DevicePage::new(vec![id("x")], Some("next".into()))),
                Some(_) => Err(RegistryError::Connection("reset".into())),
            }
        }
    }

    #[test]
    fn test_list_all_follows_tokens() {
        let registry = ThreePages {
            calls: AtomicUsize::new(0),
        };

        let all = registry.list_all().unwrap();

        let names: Vec<_> = all.iter().map(|d| d.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_pages_restartable() {
        let registry = ThreePages {
            calls: AtomicUsize::new(0),
        };

        assert_eq!(Pages::new(&registry).count(), 3);
        assert_eq!(Pages::new(&registry).count(), 3);
        assert_eq!(registry.list_all().unwrap(), registry.list_all().unwrap());
    }

    #[test]
    fn test_repeated_token_is_error() {
        let err = Looping.list_all().unwrap_err();
        assert_eq!(err, RegistryError::RepeatedToken("again".into()));
    }

    #[test]
    fn test_error_aborts_listing() {
        let mut pages = Pages::new(&Failing);
        assert!(pages.next().unwrap().is_ok());
        assert!(pages.next().unwrap().is_err());
        assert!(pages.next().is_none());

        assert!(matches!(
            Failing.list_all(),
            Err(RegistryError::Connection(_))
        ));
    }

    #[test]
    fn test_empty_token_ends_listing() {
        struct EmptyToken;
        impl DeviceRegistry for EmptyToken {
            fn list_page(&self, _token: Option<&str>) -> RegistryResult<DevicePage> {
                Ok(DevicePage::new(vec![id("only")], Some(String::new())))
            }
        }

        let pages: Vec<_> = Pages::new(&EmptyToken).collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].as_ref().unwrap().next_token, None);
    }

    #[test]
    fn test_dyn_registry() {
        let registry: Box<dyn DeviceRegistry> = Box::new(ThreePages {
            calls: AtomicUsize::new(0),
        });
        assert_eq!(registry.list_all().unwrap().len(), 3);
    }
}
