//! Identifier management using string interning for element ids
//!
//! This module provides the [`Id`] type used as the `local_id` of diagram
//! elements, and the [`ModelId`] type identifying one submission.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for element identifiers.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Runs `f` with exclusive access to the global interner.
///
/// A poisoned lock is recovered, since the interner only ever grows and a
/// panic mid-insert cannot leave it inconsistent.
fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut interner)
}

/// Element identifier, unique within one model.
///
/// Diagram editors hand out UUID-like strings for every shape and connector.
/// Interning them keeps elements `Copy` and makes comparisons cheap, which
/// matters because the similarity index compares element references all the
/// time.
///
/// # Examples
///
/// ```
/// use compass_core::identifier::Id;
///
/// let class_id = Id::new("6fb20a32-3865-45d0-b05f-9e79129b85fa");
/// let same = Id::new("6fb20a32-3865-45d0-b05f-9e79129b85fa");
/// assert_eq!(class_id, same);
/// assert_eq!(class_id, "6fb20a32-3865-45d0-b05f-9e79129b85fa");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns `true` if the identifier is the empty string.
    pub fn is_empty(&self) -> bool {
        with_interner(|interner| interner.resolve(self.0).is_none_or(str::is_empty))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = with_interner(|interner| interner.resolve(self.0).map(str::to_owned));
        write!(f, "{}", value.unwrap_or_default())
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(&value))
    }
}

/// Stable identifier of one submitted model.
///
/// Ordering matters: the engine breaks ties between equally good candidates
/// by picking the lowest `ModelId`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ModelId(u64);

impl ModelId {
    /// Creates a model id from its numeric value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ModelId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("class-1");
        let id2 = Id::new("class-1");
        let id3 = Id::new("class-2");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "class-1");
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("display_test");
        assert_eq!(format!("{}", id), "display_test");
    }

    #[test]
    fn test_from_trait() {
        let id1: Id = "test_string".into();
        let id2 = Id::new("test_string");

        assert_eq!(id1, id2);
    }

    #[test]
    fn test_is_empty() {
        assert!(Id::new("").is_empty());
        assert!(!Id::new("a").is_empty());
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let id1 = Id::new("key1");
        let id2 = Id::new("key1");
        let id3 = Id::new("key2");

        let mut map = HashMap::new();
        map.insert(id1, "value1");
        map.insert(id3, "value2");

        assert_eq!(map.get(&id2), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str_ref() {
        let id = Id::new("Component");
        let name = String::from("Component");
        let other = String::from("Element");

        assert!(id == name.as_str());
        assert!(id != other.as_str());
    }

    #[test]
    fn test_serde_as_string() {
        let id = Id::new("54748e19-2632-45ae-aa92-8949dba0ddc1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"54748e19-2632-45ae-aa92-8949dba0ddc1\"");

        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_model_id_ordering_and_display() {
        let low = ModelId::new(3);
        let high = ModelId::from(10);

        assert!(low < high);
        assert_eq!(high.get(), 10);
        assert_eq!(low.to_string(), "#3");
        assert_eq!(serde_json::to_string(&high).unwrap(), "10");
    }
}
