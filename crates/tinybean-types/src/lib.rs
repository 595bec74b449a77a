//! Core types for TinyBean.
//!
//! This crate holds the handful of types every other TinyBean crate
//! agrees on.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Model Layer                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tinybean-types      : ErrorCode, ConversationHandle ◄ HERE │
//! │  tinybean-descriptor : ComponentDescriptor, XML parsing     │
//! │  tinybean-bean       : BeanClass, Catalog, BusinessError    │
//! │  tinybean-naming     : NamingRegistry, NameResolver         │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tinybean-runtime    : Container, lifecycle, proxies, tx    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Frontend Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  tinybean-cli        : descriptor inspection                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ContainerId, ConversationHandle};
