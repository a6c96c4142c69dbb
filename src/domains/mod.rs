//! Domains module containing business logic organized by bounded contexts.
//!
//! The server exposes a single domain, tools: named operations with a
//! declared parameter schema that callers invoke by name.

pub mod tools;
