//! Deployment descriptor model for TinyBean.
//!
//! Turns XML descriptors into a typed [`Deployment`]. Parsing is pure:
//! nothing here touches a registry or a container.
//!
//! # Inputs
//!
//! | Document | Parser | Result |
//! |----------|--------|--------|
//! | `ejb-jar.xml` | [`parse_ejb_jar`] | [`Deployment`] |
//! | `jboss.xml` (optional) | [`parse_vendor`] | [`NamingOverrides`] |
//!
//! A missing vendor descriptor is not an error; use
//! [`NamingOverrides::default`].
//!
//! # Example
//!
//! ```
//! use tinybean_descriptor::{parse_ejb_jar_str, parse_vendor_str, InterfaceKind};
//!
//! let jar = r#"<ejb-jar><enterprise-beans><session>
//!     <ejb-name>Cart</ejb-name>
//!     <local-home>demo.CartLocalHome</local-home>
//!     <local>demo.CartLocal</local>
//!     <ejb-class>demo.CartBean</ejb-class>
//!     <session-type>Stateful</session-type>
//! </session></enterprise-beans></ejb-jar>"#;
//! let vendor = r#"<jboss><enterprise-beans><session>
//!     <ejb-name>Cart</ejb-name>
//!     <local-jndi-name>ejb/CartLocalHome</local-jndi-name>
//! </session></enterprise-beans></jboss>"#;
//!
//! let deployment = parse_ejb_jar_str(jar)?.with_overrides(parse_vendor_str(vendor)?);
//! assert_eq!(
//!     deployment.overrides().path("Cart", InterfaceKind::Local),
//!     Some("ejb/CartLocalHome")
//! );
//! # Ok::<(), tinybean_descriptor::ParseError>(())
//! ```

mod ejb_jar;
mod error;
mod model;
mod overrides;
mod vendor;
mod xml;

pub use ejb_jar::{parse_ejb_jar, parse_ejb_jar_str};
pub use error::ParseError;
pub use model::{
    ComponentDescriptor, Deployment, InterfaceKind, MethodTransaction, SessionType,
    TransAttribute, TransactionType, ANY_METHOD,
};
pub use overrides::{NamingOverride, NamingOverrides};
pub use vendor::{parse_vendor, parse_vendor_str};

use std::io::Read;

/// Reads a whole descriptor stream as UTF-8.
fn read_descriptor<R: Read>(mut reader: R) -> Result<String, ParseError> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(ParseError::Read)?;
    Ok(text)
}
