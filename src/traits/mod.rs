//! Core traits for resolving keys from an injector.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
