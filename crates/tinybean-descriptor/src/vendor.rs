//! Vendor naming descriptor (`jboss.xml` shape).
//!
//! Only the naming part is read: per component, `jndi-name` overrides
//! the remote home path and `local-jndi-name` the local home path.

use crate::xml::{expect_root, parse_document};
use crate::{read_descriptor, NamingOverride, NamingOverrides, ParseError};
use std::collections::HashSet;
use std::io::Read;

const ROOT: &str = "jboss";

/// Parses a vendor naming descriptor from a byte stream.
///
/// # Errors
///
/// Returns [`ParseError`] on unreadable input, malformed XML, an entry
/// without `ejb-name`, or two entries for one component.
pub fn parse_vendor<R: Read>(reader: R) -> Result<NamingOverrides, ParseError> {
    let text = read_descriptor(reader)?;
    parse_vendor_str(&text)
}

/// Parses a vendor naming descriptor from a string.
///
/// # Example
///
/// ```
/// use tinybean_descriptor::{parse_vendor_str, InterfaceKind};
///
/// let overrides = parse_vendor_str(r#"
/// <jboss>
///   <enterprise-beans>
///     <session>
///       <ejb-name>Cart</ejb-name>
///       <local-jndi-name>ejb/CartLocalHome</local-jndi-name>
///     </session>
///   </enterprise-beans>
/// </jboss>"#).unwrap();
///
/// assert_eq!(overrides.path("Cart", InterfaceKind::Local), Some("ejb/CartLocalHome"));
/// ```
///
/// # Errors
///
/// See [`parse_vendor`].
pub fn parse_vendor_str(xml: &str) -> Result<NamingOverrides, ParseError> {
    let root = parse_document(xml)?;
    expect_root(&root, ROOT)?;

    let mut overrides = NamingOverrides::new();
    let Some(beans) = root.child("enterprise-beans") else {
        return Ok(overrides);
    };

    let mut seen = HashSet::new();
    for bean in &beans.children {
        let component = bean
            .child_text("ejb-name")
            .ok_or_else(|| ParseError::missing(format!("{ROOT}/{}", bean.name), "ejb-name"))?;
        if !seen.insert(component.clone()) {
            return Err(ParseError::DuplicateComponent { name: component });
        }

        overrides.insert(NamingOverride {
            component,
            local_path: bean.child_text("local-jndi-name"),
            remote_path: bean.child_text("jndi-name"),
        });
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InterfaceKind;

    #[test]
    fn reads_both_paths() {
        let xml = r#"<!DOCTYPE jboss PUBLIC "-//JBoss//DTD JBOSS 4.0//EN" "jboss_4_0.dtd">
<jboss>
  <enterprise-beans>
    <session>
      <ejb-name>Cart</ejb-name>
      <jndi-name>ejb/Cart</jndi-name>
      <local-jndi-name>ejb/CartLocalHome</local-jndi-name>
    </session>
    <session>
      <ejb-name>Teller</ejb-name>
      <jndi-name>bank/Teller</jndi-name>
    </session>
  </enterprise-beans>
</jboss>"#;
        let overrides = parse_vendor_str(xml).expect("valid vendor descriptor");

        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides.path("Cart", InterfaceKind::Remote), Some("ejb/Cart"));
        assert_eq!(overrides.path("Cart", InterfaceKind::Local), Some("ejb/CartLocalHome"));
        assert_eq!(overrides.path("Teller", InterfaceKind::Local), None);
    }

    #[test]
    fn no_beans_is_empty() {
        let overrides = parse_vendor_str("<jboss/>").expect("valid vendor descriptor");
        assert!(overrides.is_empty());
    }

    #[test]
    fn entry_without_name_fails() {
        let err = parse_vendor_str(
            "<jboss><enterprise-beans><session><jndi-name>x</jndi-name></session></enterprise-beans></jboss>",
        )
        .expect_err("must fail");
        assert!(matches!(
            err,
            ParseError::MissingElement {
                element: "ejb-name",
                ..
            }
        ));
    }

    #[test]
    fn duplicate_entry_fails() {
        let one = "<session><ejb-name>A</ejb-name></session>";
        let xml = format!("<jboss><enterprise-beans>{one}{one}</enterprise-beans></jboss>");
        let err = parse_vendor_str(&xml).expect_err("must fail");
        assert!(matches!(err, ParseError::DuplicateComponent { .. }));
    }

    #[test]
    fn malformed_fails() {
        let err = parse_vendor_str("<jboss><enterprise-beans></jboss>").expect_err("must fail");
        assert!(matches!(err, ParseError::Malformed { .. }));
    }
}
