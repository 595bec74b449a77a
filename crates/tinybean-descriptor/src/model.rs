//! In-memory descriptor model.

use crate::{NamingOverrides, ParseError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How the container manages instances of a session component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Pooled; no per-client state.
    Stateless,
    /// One instance per client conversation.
    Stateful,
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stateless" => Ok(Self::Stateless),
            "stateful" => Ok(Self::Stateful),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stateless => write!(f, "Stateless"),
            Self::Stateful => write!(f, "Stateful"),
        }
    }
}

/// Who demarcates transactions for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// The container wraps methods according to their [`TransAttribute`].
    #[default]
    Container,
    /// The bean manages its own transactions; the container never wraps.
    Bean,
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "container" => Ok(Self::Container),
            "bean" => Ok(Self::Bean),
            _ => Err(s.to_string()),
        }
    }
}

/// Declared transaction attribute of a business method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransAttribute {
    NotSupported,
    Supports,
    Required,
    RequiresNew,
    Mandatory,
    Never,
}

impl TransAttribute {
    /// Returns `true` if the container must open a transaction around
    /// the method.
    ///
    /// There is no client-propagated transaction context, so `Required`,
    /// `RequiresNew` and `Mandatory` all start one; `Supports` never does.
    #[must_use]
    pub fn demands_transaction(&self) -> bool {
        matches!(self, Self::Required | Self::RequiresNew | Self::Mandatory)
    }
}

impl FromStr for TransAttribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "notsupported" => Ok(Self::NotSupported),
            "supports" => Ok(Self::Supports),
            "required" => Ok(Self::Required),
            "requiresnew" => Ok(Self::RequiresNew),
            "mandatory" => Ok(Self::Mandatory),
            "never" => Ok(Self::Never),
            _ => Err(s.to_string()),
        }
    }
}

/// Which flavour of client view a home belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Local,
    Remote,
}

impl InterfaceKind {
    /// Both kinds, local first (resolution order).
    pub const ALL: [InterfaceKind; 2] = [InterfaceKind::Local, InterfaceKind::Remote];
}

impl fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Metadata of one session component.
///
/// Interface and implementation fields hold identifiers
/// (e.g. `demo.cart.CartLocalHome`) that the runtime resolves
/// against its catalog.
///
/// # Example
///
/// ```
/// use tinybean_descriptor::{ComponentDescriptor, InterfaceKind, SessionType};
///
/// let cart = ComponentDescriptor::new("Cart", SessionType::Stateful, "demo.CartBean")
///     .with_local("demo.CartLocalHome", "demo.CartLocal");
///
/// assert_eq!(cart.home(InterfaceKind::Local), Some("demo.CartLocalHome"));
/// assert_eq!(cart.kinds(), vec![InterfaceKind::Local]);
/// assert!(cart.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub name: String,
    pub session_type: SessionType,
    pub local_home: Option<String>,
    pub local: Option<String>,
    pub remote_home: Option<String>,
    pub remote: Option<String>,
    pub implementation: String,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ComponentDescriptor {
    /// Creates a descriptor with no interfaces declared yet.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        session_type: SessionType,
        implementation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            session_type,
            local_home: None,
            local: None,
            remote_home: None,
            remote: None,
            implementation: implementation.into(),
            transaction_type: TransactionType::Container,
            description: None,
        }
    }

    /// Declares the local home / local component interface pair.
    #[must_use]
    pub fn with_local(mut self, home: impl Into<String>, component: impl Into<String>) -> Self {
        self.local_home = Some(home.into());
        self.local = Some(component.into());
        self
    }

    /// Declares the remote home / remote component interface pair.
    #[must_use]
    pub fn with_remote(mut self, home: impl Into<String>, component: impl Into<String>) -> Self {
        self.remote_home = Some(home.into());
        self.remote = Some(component.into());
        self
    }

    /// Sets the transaction management type.
    #[must_use]
    pub fn with_transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    /// Returns the home interface identifier for `kind`.
    #[must_use]
    pub fn home(&self, kind: InterfaceKind) -> Option<&str> {
        match kind {
            InterfaceKind::Local => self.local_home.as_deref(),
            InterfaceKind::Remote => self.remote_home.as_deref(),
        }
    }

    /// Returns the component (business) interface identifier for `kind`.
    #[must_use]
    pub fn component_interface(&self, kind: InterfaceKind) -> Option<&str> {
        match kind {
            InterfaceKind::Local => self.local.as_deref(),
            InterfaceKind::Remote => self.remote.as_deref(),
        }
    }

    /// Returns the declared client views, local first.
    #[must_use]
    pub fn kinds(&self) -> Vec<InterfaceKind> {
        InterfaceKind::ALL
            .into_iter()
            .filter(|k| self.home(*k).is_some())
            .collect()
    }

    /// Returns `true` for stateful components.
    #[must_use]
    pub fn is_stateful(&self) -> bool {
        self.session_type == SessionType::Stateful
    }

    /// Checks the structural invariants of a single descriptor.
    ///
    /// # Errors
    ///
    /// - [`ParseError::MissingElement`] for an empty name or implementation
    /// - [`ParseError::MissingHome`] when no home is declared
    /// - [`ParseError::IncompletePair`] when a home lacks its component
    ///   interface or vice versa
    pub fn validate(&self) -> Result<(), ParseError> {
        let context = format!("component '{}'", self.name);
        if self.name.trim().is_empty() {
            return Err(ParseError::missing("session", "ejb-name"));
        }
        if self.implementation.trim().is_empty() {
            return Err(ParseError::missing(context, "ejb-class"));
        }

        check_pair(&self.name, &self.local_home, "local-home", &self.local, "local")?;
        check_pair(&self.name, &self.remote_home, "home", &self.remote, "remote")?;

        if self.local_home.is_none() && self.remote_home.is_none() {
            return Err(ParseError::MissingHome {
                component: self.name.clone(),
            });
        }
        Ok(())
    }
}

fn check_pair(
    component: &str,
    home: &Option<String>,
    home_element: &'static str,
    iface: &Option<String>,
    iface_element: &'static str,
) -> Result<(), ParseError> {
    match (home, iface) {
        (Some(_), None) => Err(ParseError::IncompletePair {
            component: component.to_string(),
            present: home_element,
            missing: iface_element,
        }),
        (None, Some(_)) => Err(ParseError::IncompletePair {
            component: component.to_string(),
            present: iface_element,
            missing: home_element,
        }),
        _ => Ok(()),
    }
}

/// Transaction attribute assigned to one method (or `*`) of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodTransaction {
    pub component: String,
    /// Method name, or `*` for every method of the component.
    pub method: String,
    pub attribute: TransAttribute,
}

/// Wildcard method name in transaction declarations.
pub const ANY_METHOD: &str = "*";

/// The parsed result of one deployment: components, naming overrides
/// and method transaction attributes.
///
/// Constructed through [`Deployment::new`], which enforces the
/// cross-component invariants (unique names, transactions referring to
/// declared components). Deserializing goes through the same checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDeployment")]
pub struct Deployment {
    components: Vec<ComponentDescriptor>,
    overrides: NamingOverrides,
    transactions: Vec<MethodTransaction>,
}

/// Unchecked wire form of [`Deployment`].
#[derive(Deserialize)]
struct RawDeployment {
    components: Vec<ComponentDescriptor>,
    #[serde(default)]
    overrides: NamingOverrides,
    #[serde(default)]
    transactions: Vec<MethodTransaction>,
}

impl TryFrom<RawDeployment> for Deployment {
    type Error = ParseError;

    fn try_from(raw: RawDeployment) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.components)?
            .with_transactions(raw.transactions)?
            .with_overrides(raw.overrides))
    }
}

impl Deployment {
    /// Builds a deployment from components, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation: an invalid descriptor or
    /// [`ParseError::DuplicateComponent`].
    pub fn new(components: Vec<ComponentDescriptor>) -> Result<Self, ParseError> {
        let mut seen = HashSet::new();
        for component in &components {
            component.validate()?;
            if !seen.insert(component.name.as_str()) {
                return Err(ParseError::DuplicateComponent {
                    name: component.name.clone(),
                });
            }
        }
        Ok(Self {
            components,
            overrides: NamingOverrides::default(),
            transactions: Vec::new(),
        })
    }

    /// Attaches method transaction attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnknownComponent`] if a declaration names a
    /// component this deployment does not contain.
    pub fn with_transactions(
        mut self,
        transactions: Vec<MethodTransaction>,
    ) -> Result<Self, ParseError> {
        for tx in &transactions {
            if self.component(&tx.component).is_none() {
                return Err(ParseError::UnknownComponent {
                    context: "container-transaction",
                    component: tx.component.clone(),
                });
            }
        }
        self.transactions = transactions;
        Ok(self)
    }

    /// Attaches naming overrides, replacing any previous set.
    ///
    /// Overrides for components this deployment does not contain are
    /// kept but never consulted.
    #[must_use]
    pub fn with_overrides(mut self, overrides: NamingOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Components in declaration order.
    #[must_use]
    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    /// Looks up a component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Naming overrides from the vendor descriptor.
    #[must_use]
    pub fn overrides(&self) -> &NamingOverrides {
        &self.overrides
    }

    /// Declared method transaction attributes.
    #[must_use]
    pub fn transactions(&self) -> &[MethodTransaction] {
        &self.transactions
    }

    /// Returns the attribute governing `component.method`.
    ///
    /// A declaration naming the method exactly wins over a `*`
    /// declaration; among equals the last one declared wins.
    #[must_use]
    pub fn trans_attribute(&self, component: &str, method: &str) -> Option<TransAttribute> {
        let mut wildcard = None;
        let mut exact = None;
        for tx in self.transactions.iter().filter(|t| t.component == component) {
            if tx.method == method {
                exact = Some(tx.attribute);
            } else if tx.method == ANY_METHOD {
                wildcard = Some(tx.attribute);
            }
        }
        exact.or(wildcard)
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the deployment declares no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> ComponentDescriptor {
        ComponentDescriptor::new("Cart", SessionType::Stateful, "demo.CartBean")
            .with_local("demo.CartLocalHome", "demo.CartLocal")
    }

    #[test]
    fn session_type_parse() {
        assert_eq!("Stateful".parse::<SessionType>(), Ok(SessionType::Stateful));
        assert_eq!(" stateless ".parse::<SessionType>(), Ok(SessionType::Stateless));
        assert!("Entity".parse::<SessionType>().is_err());
    }

    #[test]
    fn trans_attribute_parse_variants() {
        assert_eq!("Required".parse::<TransAttribute>(), Ok(TransAttribute::Required));
        assert_eq!("RequiresNew".parse::<TransAttribute>(), Ok(TransAttribute::RequiresNew));
        assert_eq!("Not_Supported".parse::<TransAttribute>(), Ok(TransAttribute::NotSupported));
        assert!("Sometimes".parse::<TransAttribute>().is_err());
    }

    #[test]
    fn only_some_attributes_demand_a_transaction() {
        assert!(TransAttribute::Required.demands_transaction());
        assert!(TransAttribute::RequiresNew.demands_transaction());
        assert!(TransAttribute::Mandatory.demands_transaction());
        assert!(!TransAttribute::Supports.demands_transaction());
        assert!(!TransAttribute::NotSupported.demands_transaction());
        assert!(!TransAttribute::Never.demands_transaction());
    }

    #[test]
    fn kinds_local_first() {
        let both = cart().with_remote("demo.CartHome", "demo.Cart");
        assert_eq!(both.kinds(), vec![InterfaceKind::Local, InterfaceKind::Remote]);
        assert_eq!(both.component_interface(InterfaceKind::Remote), Some("demo.Cart"));
    }

    #[test]
    fn validate_requires_a_home() {
        let bare = ComponentDescriptor::new("Bare", SessionType::Stateless, "demo.Bare");
        assert!(matches!(bare.validate(), Err(ParseError::MissingHome { .. })));
    }

    #[test]
    fn validate_rejects_half_pair() {
        let mut d = cart();
        d.local = None;
        let err = d.validate().expect_err("half pair must fail");
        assert!(matches!(
            err,
            ParseError::IncompletePair {
                present: "local-home",
                missing: "local",
                ..
            }
        ));
    }

    #[test]
    fn deployment_rejects_duplicate_names() {
        let err = Deployment::new(vec![cart(), cart()]).expect_err("duplicate must fail");
        assert!(matches!(err, ParseError::DuplicateComponent { name } if name == "Cart"));
    }

    #[test]
    fn exact_method_beats_wildcard() {
        let deployment = Deployment::new(vec![cart()])
            .and_then(|d| {
                d.with_transactions(vec![
                    MethodTransaction {
                        component: "Cart".into(),
                        method: "addItem".into(),
                        attribute: TransAttribute::Never,
                    },
                    MethodTransaction {
                        component: "Cart".into(),
                        method: ANY_METHOD.into(),
                        attribute: TransAttribute::Required,
                    },
                ])
            })
            .expect("valid deployment");

        assert_eq!(
            deployment.trans_attribute("Cart", "addItem"),
            Some(TransAttribute::Never)
        );
        assert_eq!(
            deployment.trans_attribute("Cart", "getTotalAmount"),
            Some(TransAttribute::Required)
        );
        assert_eq!(deployment.trans_attribute("Other", "x"), None);
    }

    #[test]
    fn deserializing_checks_invariants() {
        let deployment = Deployment::new(vec![cart()]).expect("valid");
        let value = serde_json::to_value(&deployment).expect("serialize");
        let back: Deployment = serde_json::from_value(value.clone()).expect("deserialize");
        assert_eq!(back, deployment);

        let mut duplicated = value;
        let component = duplicated["components"][0].clone();
        duplicated["components"]
            .as_array_mut()
            .expect("components array")
            .push(component);
        let err = serde_json::from_value::<Deployment>(duplicated).expect_err("duplicate");
        assert!(err.to_string().contains("Cart"), "{err}");
    }

    #[test]
    fn deserializing_rejects_unknown_transaction_component() {
        let mut value = serde_json::to_value(Deployment::new(vec![cart()]).expect("valid"))
            .expect("serialize");
        let ghost = MethodTransaction {
            component: "Ghost".into(),
            method: ANY_METHOD.into(),
            attribute: TransAttribute::Required,
        };
        value["transactions"] = serde_json::json!([ghost]);
        assert!(serde_json::from_value::<Deployment>(value).is_err());
    }

    #[test]
    fn transactions_must_name_known_components() {
        let err = Deployment::new(vec![cart()])
            .and_then(|d| {
                d.with_transactions(vec![MethodTransaction {
                    component: "Ghost".into(),
                    method: ANY_METHOD.into(),
                    attribute: TransAttribute::Required,
                }])
            })
            .expect_err("unknown component must fail");
        assert!(matches!(err, ParseError::UnknownComponent { .. }));
    }
}
