//! Declaration registry for the object model.
//!
//! Holds class and interface declarations, validates them at freeze and
//! answers member resolution queries against the frozen vtables.

mod checks;
mod completion;
pub mod hierarchy;
pub mod override_check;
pub mod resolver;
pub mod table;
pub mod vtable;

pub use hierarchy::{Hierarchy, SupertypeEdge};
pub use override_check::{Ancestor, Checked, check_member, own_dispatch};
pub use resolver::{Receiver, Resolved};
pub use table::{DeclTable, MemberInfo};
pub use vtable::{MemberRef, VTable, VTableEntry};
