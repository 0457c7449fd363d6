//! Cursor protocol shared by all identity collections.
//!
//! A cursor *is* the current element while it is valid: `advance()` moves the
//! position in place and the cursor itself is passed wherever an [`IdRef`] is
//! expected. There is no "next element" return value.
//!
//! ```text
//! let mut it = ids.iter();
//! while it.valid() {
//!     heap.insert(dist(&it), &it);
//!     it.advance();
//! }
//! ```

use super::{Id, IdRef};
use crate::error::{IdError, Result};

/// Forward cursor over an identity collection.
pub trait IdCursor: IdRef {
    /// Whether the cursor currently points at an element.
    fn valid(&self) -> bool;

    /// Move to the next element.
    fn advance(&mut self) -> &mut Self;

    /// Checked dereference of the current element.
    ///
    /// Fails with [`IdError::InvalidReference`] when the cursor is exhausted.
    #[inline]
    fn try_id(&self) -> Result<Id> {
        if self.valid() {
            Ok(self.id())
        } else {
            Err(IdError::InvalidReference(
                "cursor is not positioned on an element".into(),
            ))
        }
    }
}

/// Cursor that can edit the collection it walks.
///
/// After [`remove_current`](IdCursorMut::remove_current) the cursor steps
/// back by one, so the following `advance()` visits the element that took
/// the removed one's place. The usual filter loop therefore reads:
///
/// ```text
/// let mut it = ids.iter_mut();
/// while it.valid() {
///     if reject(&it) { it.remove_current()?; }
///     it.advance();
/// }
/// ```
pub trait IdCursorMut: IdCursor {
    /// Replace the current element.
    fn set_current(&mut self, value: &impl IdRef) -> Result<()>;

    /// Remove the current element.
    fn remove_current(&mut self) -> Result<()>;
}

/// Random-access cursor over an array-like collection.
///
/// Positions outside `0..len` are representable (e.g. after `retract()` at
/// the start); the cursor is then simply not `valid()`.
pub trait ArrayCursor: IdCursor {
    /// Current offset.
    fn offset(&self) -> isize;

    /// Jump to `offset`.
    fn seek(&mut self, offset: isize) -> &mut Self;

    /// Move to the previous element.
    #[inline]
    fn retract(&mut self) -> &mut Self {
        let offset = self.offset() - 1;
        self.seek(offset)
    }

    /// Move by `count` positions (negative moves backwards).
    #[inline]
    fn advance_by(&mut self, count: isize) -> &mut Self {
        let offset = self.offset() + count;
        self.seek(offset)
    }
}

/// Checked conversion of a signed cursor position into an index.
#[inline]
pub(crate) fn position(pos: isize, len: usize) -> Option<usize> {
    if pos >= 0 && (pos as usize) < len {
        Some(pos as usize)
    } else {
        None
    }
}
