//! Read-only member cells.
//!
//! [`Protected`] holds a component's published member (an owned
//! collaborator or a signal alias) and rejects reassignment while it is
//! marked read-only. The owner lifts the restriction with
//! [`make_writable`](Protected::make_writable) only while tearing down, then
//! moves the value out with [`take`](Protected::take).
//!
//! Mutating the *held* value through [`get_mut`](Protected::get_mut) is always
//! allowed; only replacing or removing it is guarded.
//!
//! ```rust
//! use lumen_core::{CoreError, Protected};
//!
//! let mut cell = Protected::read_only("gain", 1.0_f32);
//! assert_eq!(cell.set(2.0), Err(CoreError::ReadOnly { member: "gain" }));
//!
//! cell.make_writable();
//! assert_eq!(cell.take(), Ok(1.0));
//! assert!(cell.is_vacant());
//! ```

use crate::error::CoreError;

#[derive(Debug, Clone)]
enum Slot<T> {
    ReadOnly(T),
    Writable(T),
    Vacant,
}

/// A named member that can be locked against reassignment.
#[derive(Debug, Clone)]
pub struct Protected<T> {
    member: &'static str,
    slot: Slot<T>,
}

impl<T> Protected<T> {
    /// Wrap `value` as a read-only member.
    pub fn read_only(member: &'static str, value: T) -> Self {
        Self {
            member,
            slot: Slot::ReadOnly(value),
        }
    }

    /// Wrap `value` as a writable member.
    pub fn writable(member: &'static str, value: T) -> Self {
        Self {
            member,
            slot: Slot::Writable(value),
        }
    }

    /// Member name used in errors.
    pub fn member(&self) -> &'static str {
        self.member
    }

    /// Borrow the held value, if any.
    pub fn get(&self) -> Option<&T> {
        match &self.slot {
            Slot::ReadOnly(v) | Slot::Writable(v) => Some(v),
            Slot::Vacant => None,
        }
    }

    /// Mutably borrow the held value, if any. Allowed even when read-only.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match &mut self.slot {
            Slot::ReadOnly(v) | Slot::Writable(v) => Some(v),
            Slot::Vacant => None,
        }
    }

    /// True while reassignment is rejected.
    pub fn is_read_only(&self) -> bool {
        matches!(self.slot, Slot::ReadOnly(_))
    }

    /// True once the value has been taken.
    pub fn is_vacant(&self) -> bool {
        matches!(self.slot, Slot::Vacant)
    }

    /// Replace the held value.
    ///
    /// Fails with [`CoreError::ReadOnly`] while the member is read-only.
    pub fn set(&mut self, value: T) -> Result<(), CoreError> {
        if self.is_read_only() {
            return Err(CoreError::ReadOnly {
                member: self.member,
            });
        }
        self.slot = Slot::Writable(value);
        Ok(())
    }

    /// Reject further reassignment. No effect on a vacant member.
    pub fn make_read_only(&mut self) {
        self.slot = match std::mem::replace(&mut self.slot, Slot::Vacant) {
            Slot::ReadOnly(v) | Slot::Writable(v) => Slot::ReadOnly(v),
            Slot::Vacant => Slot::Vacant,
        };
    }

    /// Allow reassignment and removal.
    pub fn make_writable(&mut self) {
        self.slot = match std::mem::replace(&mut self.slot, Slot::Vacant) {
            Slot::ReadOnly(v) | Slot::Writable(v) => Slot::Writable(v),
            Slot::Vacant => Slot::Vacant,
        };
    }

    /// Move the value out, leaving the member vacant.
    ///
    /// Fails with [`CoreError::ReadOnly`] while read-only and with
    /// [`CoreError::Vacant`] if already taken.
    pub fn take(&mut self) -> Result<T, CoreError> {
        match std::mem::replace(&mut self.slot, Slot::Vacant) {
            Slot::Writable(v) => Ok(v),
            Slot::ReadOnly(v) => {
                self.slot = Slot::ReadOnly(v);
                Err(CoreError::ReadOnly {
                    member: self.member,
                })
            }
            Slot::Vacant => Err(CoreError::Vacant {
                member: self.member,
            }),
        }
    }
}
