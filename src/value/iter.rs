// Iteration over array elements and map entries

use crate::internal::error::{Error, Result};
use crate::schema::TypeTag;
use crate::value::generic::{ValueInterface, ValueInterfaceMut, ValueMut, ValueRef};

/// One step of an iteration: 1-based position, the map key (maps only) and
/// the child value.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub position: usize,
    pub key: Option<&'a str>,
    pub value: ValueRef<'a>,
}

/// Mutable counterpart of `Entry`.
#[derive(Debug)]
pub struct EntryMut<'a> {
    pub position: usize,
    pub key: Option<&'a str>,
    pub value: ValueMut<'a>,
}

fn check_container(tag: TypeTag) -> Result<()> {
    match tag {
        TypeTag::Array | TypeTag::Map => Ok(()),
        other => Err(Error::type_mismatch("iterate", other)),
    }
}

/// Borrowing iterator over a container value.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    value: ValueRef<'a>,
    next: usize,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(value: ValueRef<'a>) -> Result<Self> {
        check_container(value.type_tag())?;
        Ok(Entries { value, next: 1 })
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (value, key) = self.value.get_by_index(self.next).ok()?;
        let entry = Entry {
            position: self.next,
            key,
            value,
        };
        self.next += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self
            .value
            .size()
            .map(|size| (size + 1).saturating_sub(self.next))
            .unwrap_or(0);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Entries<'_> {}

/// Position-only cursor that does not hold a borrow between steps.
///
/// The container's size is read again on every step, so elements appended
/// while iterating are visited and a shrunken container ends the walk.
#[derive(Debug, Clone, Default)]
pub struct ValueCursor {
    next: usize,
}

impl ValueCursor {
    /// Starts a cursor for `container`, which must be an array or map.
    pub fn new<V: ValueInterface + ?Sized>(container: &V) -> Result<Self> {
        check_container(container.type_tag())?;
        Ok(ValueCursor { next: 1 })
    }

    /// Position the next step will visit.
    pub fn position(&self) -> usize {
        self.next
    }

    /// Next entry of `container`, or `None` once the position passes its size.
    pub fn next<'v, V: ValueInterface + ?Sized>(&mut self, container: &'v V) -> Result<Option<Entry<'v>>> {
        let size = container.size()?;
        if self.next > size {
            return Ok(None);
        }
        let position = self.next;
        let (value, key) = container.get_by_index(position)?;
        self.next += 1;
        Ok(Some(Entry { position, key, value }))
    }

    /// Exclusive variant of `next`.
    pub fn next_mut<'v, V: ValueInterfaceMut + ?Sized>(
        &mut self,
        container: &'v mut V,
    ) -> Result<Option<EntryMut<'v>>> {
        let size = container.size()?;
        if self.next > size {
            return Ok(None);
        }
        let position = self.next;
        let (value, key) = container.get_by_index_mut(position)?;
        self.next += 1;
        Ok(Some(EntryMut { position, key, value }))
    }
}
