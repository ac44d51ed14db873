//! Runtime type registry: element names to type descriptors, plus the
//! resolver that picks attach operations by naming convention.

pub mod core;
pub mod descriptor;
pub(crate) mod resolver;

pub use core::TypeRegistry;
pub use descriptor::{text_leaf, FactoryError, TypeBinding, TypeDescriptor};
pub(crate) use resolver::{bind_member, BindFailure, BindValue};
