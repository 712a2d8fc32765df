//! Same-value comparison used on writes.

use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

/// Cheap identity comparison.
///
/// Scalars and strings compare by value. `Rc` and `Arc` compare by address,
/// so installing a freshly allocated value always counts as a change even if
/// its contents are equal. Owned compound data has no identity to compare
/// and is deliberately not covered; wrap it in `Rc` to store it in a cell.
pub trait SameValue {
    /// Returns true if writing `other` over `self` would be a no-op.
    fn same_value(&self, other: &Self) -> bool;
}

/// Free-function form of [`SameValue::same_value`].
pub fn same_value<T: SameValue + ?Sized>(a: &T, b: &T) -> bool {
    a.same_value(b)
}

macro_rules! same_value_by_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SameValue for $ty {
                #[inline]
                fn same_value(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

same_value_by_eq!(
    (), bool, char, str, String,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

impl SameValue for &str {
    fn same_value(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: SameValue> SameValue for Option<T> {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_value(b),
            _ => false,
        }
    }
}

impl<T: ?Sized> SameValue for Rc<T> {
    fn same_value(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> SameValue for Arc<T> {
    fn same_value(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl SameValue for Value {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}
