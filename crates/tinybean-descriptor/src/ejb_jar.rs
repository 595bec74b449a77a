//! Standard deployment descriptor (`ejb-jar.xml` shape).
//!
//! ```text
//! <ejb-jar>
//!   <enterprise-beans>
//!     <session> ... </session>         → ComponentDescriptor
//!     <entity> / <message-driven>      → skipped (warned)
//!   </enterprise-beans>
//!   <assembly-descriptor>
//!     <container-transaction>          → MethodTransaction per <method>
//!   </assembly-descriptor>
//! </ejb-jar>
//! ```

use crate::xml::{expect_root, parse_document, Element};
use crate::{
    read_descriptor, ComponentDescriptor, Deployment, MethodTransaction, ParseError, SessionType,
    TransAttribute, TransactionType,
};
use std::io::Read;
use tracing::{debug, warn};

const ROOT: &str = "ejb-jar";

/// Parses a standard deployment descriptor from a byte stream.
///
/// # Errors
///
/// Returns [`ParseError`] when the stream cannot be read, the XML is
/// malformed, or a component misses a required element.
pub fn parse_ejb_jar<R: Read>(reader: R) -> Result<Deployment, ParseError> {
    let text = read_descriptor(reader)?;
    parse_ejb_jar_str(&text)
}

/// Parses a standard deployment descriptor from a string.
///
/// # Example
///
/// ```
/// use tinybean_descriptor::{parse_ejb_jar_str, SessionType};
///
/// let deployment = parse_ejb_jar_str(r#"
/// <ejb-jar>
///   <enterprise-beans>
///     <session>
///       <ejb-name>Cart</ejb-name>
///       <local-home>demo.CartLocalHome</local-home>
///       <local>demo.CartLocal</local>
///       <ejb-class>demo.CartBean</ejb-class>
///       <session-type>Stateful</session-type>
///     </session>
///   </enterprise-beans>
/// </ejb-jar>"#).unwrap();
///
/// let cart = deployment.component("Cart").unwrap();
/// assert_eq!(cart.session_type, SessionType::Stateful);
/// ```
///
/// # Errors
///
/// See [`parse_ejb_jar`].
pub fn parse_ejb_jar_str(xml: &str) -> Result<Deployment, ParseError> {
    let root = parse_document(xml)?;
    expect_root(&root, ROOT)?;

    let beans = root
        .child("enterprise-beans")
        .ok_or_else(|| ParseError::missing(ROOT, "enterprise-beans"))?;

    let mut components = Vec::new();
    for bean in &beans.children {
        match bean.name.as_str() {
            "session" => components.push(parse_session(bean)?),
            "entity" | "message-driven" => {
                warn!(
                    kind = %bean.name,
                    name = bean.child_text("ejb-name").as_deref().unwrap_or("<unnamed>"),
                    "Skipping unsupported component kind"
                );
            }
            other => debug!(element = other, "Ignoring unknown element in enterprise-beans"),
        }
    }

    let transactions = match root.child("assembly-descriptor") {
        Some(assembly) => parse_transactions(assembly)?,
        None => Vec::new(),
    };

    Deployment::new(components)?.with_transactions(transactions)
}

fn parse_session(bean: &Element) -> Result<ComponentDescriptor, ParseError> {
    let name = bean
        .child_text("ejb-name")
        .ok_or_else(|| ParseError::missing("session", "ejb-name"))?;
    let context = format!("component '{name}'");

    let implementation = bean
        .child_text("ejb-class")
        .ok_or_else(|| ParseError::missing(context.clone(), "ejb-class"))?;

    let session_type = bean
        .child_text("session-type")
        .ok_or_else(|| ParseError::missing(context.clone(), "session-type"))?;
    let session_type: SessionType = session_type
        .parse()
        .map_err(|v: String| ParseError::invalid(context.clone(), "session-type", v))?;

    let transaction_type = match bean.child_text("transaction-type") {
        Some(value) => value
            .parse::<TransactionType>()
            .map_err(|v| ParseError::invalid(context.clone(), "transaction-type", v))?,
        None => TransactionType::default(),
    };

    let descriptor = ComponentDescriptor {
        name,
        session_type,
        local_home: bean.child_text("local-home"),
        local: bean.child_text("local"),
        remote_home: bean.child_text("home"),
        remote: bean.child_text("remote"),
        implementation,
        transaction_type,
        description: bean.child_text("description"),
    };
    descriptor.validate()?;
    Ok(descriptor)
}

fn parse_transactions(assembly: &Element) -> Result<Vec<MethodTransaction>, ParseError> {
    let mut out = Vec::new();
    for decl in assembly.children_named("container-transaction") {
        let attribute = decl
            .child_text("trans-attribute")
            .ok_or_else(|| ParseError::missing("container-transaction", "trans-attribute"))?;
        let attribute: TransAttribute = attribute
            .parse()
            .map_err(|v: String| ParseError::invalid("container-transaction", "trans-attribute", v))?;

        for method in decl.children_named("method") {
            let component = method
                .child_text("ejb-name")
                .ok_or_else(|| ParseError::missing("container-transaction/method", "ejb-name"))?;
            let name = method
                .child_text("method-name")
                .ok_or_else(|| ParseError::missing("container-transaction/method", "method-name"))?;
            out.push(MethodTransaction {
                component,
                method: name,
                attribute,
            });
        }
    }
    Ok(out)
}
