// Generic value interface
//
// Values of any schema share one interface: typed scalar access, positional
// and named child access, union branch selection, comparison, hashing and
// literal conversion.

pub(crate) mod ast;
pub(crate) mod compare;
pub(crate) mod datum;
pub mod generic;
pub mod iter;
pub mod scalar;

pub use generic::{Value, ValueInterface, ValueInterfaceMut, ValueMut, ValueRef};
pub use iter::{Entries, Entry, EntryMut, ValueCursor};
pub use scalar::Scalar;
