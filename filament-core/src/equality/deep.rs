//! Structural equality.
//!
//! Null-like values are modeled with `Option`: two `None`s are equal, a
//! `None` never equals a `Some`. Keyed collections must have the same size
//! and every key of the left side must be present on the right with a deeply
//! equal value; with the size check this makes the comparison symmetric.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::Result;

/// Structural (deep) equality.
pub trait DeepEq {
    /// Returns true if `self` and `other` are structurally equal.
    fn deep_eq(&self, other: &Self) -> bool;
}

/// Compare two values structurally.
pub fn deep_equal<T: DeepEq + ?Sized>(a: &T, b: &T) -> bool {
    a.deep_eq(b)
}

/// Compare any two serializable values by their JSON representation.
///
/// Fails if either value cannot be represented as JSON (for example a map
/// with non-string keys).
pub fn deep_equal_serialized<A, B>(a: &A, b: &B) -> Result<bool>
where
    A: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    let a = serde_json::to_value(a)?;
    let b = serde_json::to_value(b)?;
    Ok(a.deep_eq(&b))
}

/// Wrapper that compares any `Serialize` type through its JSON form.
///
/// Lets plain serde structs be watched without a hand-written `DeepEq`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T: Serialize> DeepEq for Json<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        match deep_equal_serialized(&self.0, &other.0) {
            Ok(equal) => equal,
            Err(err) => {
                tracing::warn!(error = %err, "snapshot failed, treating values as different");
                false
            }
        }
    }
}

macro_rules! deep_eq_by_partial_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeepEq for $ty {
                #[inline]
                fn deep_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

deep_eq_by_partial_eq!(
    (), bool, char, str, String,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

impl<T: DeepEq + ?Sized> DeepEq for &T {
    fn deep_eq(&self, other: &Self) -> bool {
        (**self).deep_eq(*other)
    }
}

impl<T: DeepEq + ?Sized> DeepEq for Box<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        (**self).deep_eq(other)
    }
}

impl<T: DeepEq + ?Sized> DeepEq for Rc<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other) || (**self).deep_eq(other)
    }
}

impl<T: DeepEq + ?Sized> DeepEq for Arc<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || (**self).deep_eq(other)
    }
}

impl<T: DeepEq> DeepEq for Option<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.deep_eq(b),
            _ => false,
        }
    }
}

impl<T: DeepEq> DeepEq for [T] {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.deep_eq(b))
    }
}

impl<T: DeepEq, const N: usize> DeepEq for [T; N] {
    fn deep_eq(&self, other: &Self) -> bool {
        self.as_slice().deep_eq(other.as_slice())
    }
}

impl<T: DeepEq> DeepEq for Vec<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.as_slice().deep_eq(other.as_slice())
    }
}

impl<T: DeepEq> DeepEq for VecDeque<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.deep_eq(b))
    }
}

impl<K, V, S> DeepEq for HashMap<K, V, S>
where
    K: Eq + Hash,
    V: DeepEq,
    S: BuildHasher,
{
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|o| value.deep_eq(o)))
    }
}

impl<K: Ord, V: DeepEq> DeepEq for BTreeMap<K, V> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|o| value.deep_eq(o)))
    }
}

impl<K, V, S> DeepEq for IndexMap<K, V, S>
where
    K: Eq + Hash,
    V: DeepEq,
    S: BuildHasher,
{
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|o| value.deep_eq(o)))
    }
}

impl<T: Eq + Hash, S: BuildHasher> DeepEq for HashSet<T, S> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl<T: Ord> DeepEq for BTreeSet<T> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl<T: Eq + Hash, S: BuildHasher> DeepEq for IndexSet<T, S> {
    fn deep_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

macro_rules! deep_eq_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: DeepEq),+> DeepEq for ($($name,)+) {
            fn deep_eq(&self, other: &Self) -> bool {
                $(self.$idx.deep_eq(&other.$idx))&&+
            }
        }
    };
}

deep_eq_tuple!(A: 0);
deep_eq_tuple!(A: 0, B: 1);
deep_eq_tuple!(A: 0, B: 1, C: 2);
deep_eq_tuple!(A: 0, B: 1, C: 2, D: 3);

/// JSON numbers compare by numeric value, so `1` equals `1.0`.
fn number_eq(a: &Number, b: &Number) -> bool {
    if a.is_f64() || b.is_f64() {
        a.as_f64() == b.as_f64()
    } else {
        a == b
    }
}

impl DeepEq for Value {
    fn deep_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => number_eq(a, b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.deep_eq(b),
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(key, value)| b.get(key).is_some_and(|o| value.deep_eq(o)))
            }
            _ => false,
        }
    }
}
