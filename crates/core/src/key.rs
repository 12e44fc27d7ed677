//! Process-wide key tokens
//!
//! Record fields and map entries are addressed by [`Key`]s. A key is declared
//! by name once; every later declaration of the same name anywhere in the
//! process returns the same token. Comparison is by token address only, so a
//! record lookup is a pointer-equality scan rather than text hashing.
//!
//! Tokens are leaked on first declaration and live for the rest of the
//! process.
//!
//! ```ignore
//! let a = Key::declare("name");
//! let b = key!(name);
//! assert_eq!(a, b);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock};
use tracing::debug;

/// Backing storage for one declared key
#[derive(Debug)]
struct KeyToken {
    name: &'static str,
}

/// Identity token for a record field or map key
#[derive(Clone, Copy)]
pub struct Key {
    token: &'static KeyToken,
}

/// Global registry: name -> leaked token
static KEY_REGISTRY: OnceLock<Mutex<HashMap<&'static str, &'static KeyToken>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<&'static str, &'static KeyToken>> {
    KEY_REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

impl Key {
    /// Declare (or look up) the key for `name`
    ///
    /// Idempotent and safe to call from any thread. Declaration order does
    /// not matter.
    pub fn declare(name: &str) -> Key {
        // A poisoned lock only means another declaration panicked; the map
        // itself is never left half-updated.
        let mut keys = registry().lock().unwrap_or_else(|e| e.into_inner());
        if let Some(&token) = keys.get(name) {
            return Key { token };
        }

        let name: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let token: &'static KeyToken = Box::leak(Box::new(KeyToken { name }));
        keys.insert(name, token);
        debug!(key = name, total = keys.len(), "declared key");
        Key { token }
    }

    /// The name this key was declared with
    pub fn name(&self) -> &'static str {
        self.token.name
    }

    /// Token address, the key's identity
    pub fn as_ptr(&self) -> *const () {
        self.token as *const KeyToken as *const ()
    }
}

/// Number of distinct keys declared so far
pub fn declared_key_count() -> usize {
    registry().lock().unwrap_or_else(|e| e.into_inner()).len()
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.token, other.token)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_ptr().hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.token.name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token.name)
    }
}

/// Key for a literal field name, cached at the call site
///
/// The first evaluation declares the key; later evaluations of the same call
/// site are a single atomic load.
#[macro_export]
macro_rules! key {
    ($name:ident) => {{
        static KEY: ::std::sync::OnceLock<$crate::key::Key> = ::std::sync::OnceLock::new();
        *KEY.get_or_init(|| $crate::key::Key::declare(stringify!($name)))
    }};
}
