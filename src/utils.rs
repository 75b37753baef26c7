#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! impl_from {
    ($struct_type:ty, $integer_type:ty) => {
        impl From<$integer_type> for $struct_type {
            fn from(value: $integer_type) -> Self {
                Self(value as u64)
            }
        }
    };
}

macro_rules! impl_mul_div {
    ($struct_type:tt, $integer_type:ty) => {
        impl std::ops::Mul<$integer_type> for $struct_type {
            type Output = Self;

            fn mul(self, rhs: $integer_type) -> Self {
                Self(self.0 * rhs as u64)
            }
        }

        impl std::ops::Div<$integer_type> for $struct_type {
            type Output = Self;

            fn div(self, rhs: $integer_type) -> Self {
                Self(self.0 / rhs as u64)
            }
        }
    };
}

/// Bytes

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bytes(pub u64);

// Bytes + Bytes = Bytes
impl std::ops::Add<Bytes> for Bytes {
    type Output = Self;

    fn add(self, rhs: Bytes) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign<Bytes> for Bytes {
    fn add_assign(&mut self, rhs: Self) {
        *self = Self(self.0 + rhs.0);
    }
}

// Bytes - Bytes = Bytes, callers check ordering first
impl std::ops::Sub<Bytes> for Bytes {
    type Output = Self;

    fn sub(self, rhs: Bytes) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl_mul_div!(Bytes, u32);
impl_mul_div!(Bytes, u64);
impl_mul_div!(Bytes, usize);

impl From<Bytes> for usize {
    fn from(bytes: Bytes) -> usize {
        bytes.0 as usize
    }
}

impl_from!(Bytes, u8);
impl_from!(Bytes, u16);
impl_from!(Bytes, u32);
impl_from!(Bytes, u64);
impl_from!(Bytes, usize);

///
pub fn align_to_multiple(location: u64, alignment: u64) -> u64 {
    (location + (alignment - 1)) & (!(alignment - 1))
}

///
pub fn align_down(location: u64, alignment: u64) -> u64 {
    location & !(alignment - 1)
}

/// An intercepted argument the capture layer may temporarily replace with a
/// driver-facing value.
///
/// `value` is what the driver sees. Once overridden, `original` keeps what
/// the application passed; recorders must serialize [`Overridable::recorded`]
/// and the pipeline puts the original back through [`OverrideGuard`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Overridable<T: Copy> {
    pub value: T,
    original: Option<T>,
}

impl<T: Copy> Overridable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            original: None,
        }
    }

    /// Applies `mutate` to the driver-facing value, remembering the first
    /// original seen. Returns true if the value was overridden.
    pub fn override_with<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let saved = self.value;
        if mutate(&mut self.value) {
            if self.original.is_none() {
                self.original = Some(saved);
            }
            true
        } else {
            self.value = saved;
            false
        }
    }

    pub fn is_overridden(&self) -> bool {
        self.original.is_some()
    }

    /// The application-visible value.
    pub fn recorded(&self) -> T {
        self.original.unwrap_or(self.value)
    }

    pub fn restore(&mut self) {
        if let Some(original) = self.original.take() {
            self.value = original;
        }
    }
}

/// Anything holding `Overridable` arguments that can put them all back.
pub trait RestoreOverrides {
    fn restore_overrides(&mut self);
}

/// Scoped mutate-then-restore guard: derefs to the guarded value and
/// restores every overridden argument when dropped, on every exit path.
pub struct OverrideGuard<'a, T: RestoreOverrides> {
    inner: &'a mut T,
}

impl<'a, T: RestoreOverrides> OverrideGuard<'a, T> {
    pub fn new(inner: &'a mut T) -> Self {
        Self { inner }
    }
}

impl<'a, T: RestoreOverrides> std::ops::Deref for OverrideGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.inner
    }
}

impl<'a, T: RestoreOverrides> std::ops::DerefMut for OverrideGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.inner
    }
}

impl<'a, T: RestoreOverrides> Drop for OverrideGuard<'a, T> {
    fn drop(&mut self) {
        self.inner.restore_overrides();
    }
}
