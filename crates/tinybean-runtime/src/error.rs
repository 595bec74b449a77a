//! Runtime layer errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`LifecycleError::NoSuchInstance`] | `LIFECYCLE_NO_SUCH_INSTANCE` | No |
//! | [`LifecycleError::AlreadyRemoved`] | `LIFECYCLE_ALREADY_REMOVED` | No |
//! | [`LifecycleError::Instantiation`] | `LIFECYCLE_INSTANTIATION` | No |
//! | [`LifecycleError::PoolExhausted`] | `LIFECYCLE_POOL_EXHAUSTED` | Yes |
//! | [`LifecycleError::Undeployed`] | `LIFECYCLE_UNDEPLOYED` | No |
//! | [`ProxyError::UnknownClass`] | `PROXY_UNKNOWN_CLASS` | No |
//! | [`ProxyError::UnknownInterface`] | `PROXY_UNKNOWN_INTERFACE` | No |
//! | [`ProxyError::MissingMethod`] | `PROXY_MISSING_METHOD` | No |
//! | [`ProxyError::InvalidHomeMethod`] | `PROXY_INVALID_HOME_METHOD` | No |
//! | [`ProxyError::NoSuchView`] | `PROXY_NO_SUCH_VIEW` | No |
//! | [`InvocationError::Business`] | `INVOKE_BUSINESS` | No |
//! | [`InvocationError::Lifecycle`] | `INVOKE_LIFECYCLE` | inner |
//! | [`InvocationError::Transaction`] | `INVOKE_TRANSACTION` | inner |
//! | [`InvocationError::NoSuchMethod`] | `INVOKE_NO_SUCH_METHOD` | No |
//! | [`DeploymentError::Parse`] | `DEPLOY_PARSE` | No |
//! | [`DeploymentError::Naming`] | `DEPLOY_NAMING` | No |
//! | [`DeploymentError::Proxy`] | `DEPLOY_PROXY` | No |
//! | [`DeploymentError::AlreadyDeployed`] | `DEPLOY_ALREADY_DEPLOYED` | No |
//!
//! Business failures are never rewritten: [`InvocationError::Business`]
//! carries the bean's [`BusinessError`] verbatim.

use crate::tx::TransactionError;
use thiserror::Error;
use tinybean_bean::BusinessError;
use tinybean_descriptor::{InterfaceKind, ParseError};
use tinybean_naming::NamingError;
use tinybean_types::{ConversationHandle, ErrorCode};

/// Instance lifecycle failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    /// Handle was never issued by this container, or its instance is gone.
    #[error("no such instance: {handle}")]
    NoSuchInstance { handle: ConversationHandle },

    /// `remove` called on an instance that was already removed.
    #[error("instance already removed: {handle}")]
    AlreadyRemoved { handle: ConversationHandle },

    /// Constructor or `create*` initializer failed.
    #[error("failed to instantiate {component}: {source}")]
    Instantiation {
        component: String,
        #[source]
        source: BusinessError,
    },

    /// Stateless pool at capacity.
    #[error("instance pool for {component} exhausted (max {max_size})")]
    PoolExhausted { component: String, max_size: usize },

    /// The container was undeployed.
    #[error("container undeployed")]
    Undeployed,
}

impl ErrorCode for LifecycleError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoSuchInstance { .. } => "LIFECYCLE_NO_SUCH_INSTANCE",
            Self::AlreadyRemoved { .. } => "LIFECYCLE_ALREADY_REMOVED",
            Self::Instantiation { .. } => "LIFECYCLE_INSTANTIATION",
            Self::PoolExhausted { .. } => "LIFECYCLE_POOL_EXHAUSTED",
            Self::Undeployed => "LIFECYCLE_UNDEPLOYED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }
}

/// Dispatch table construction failure, raised at deploy time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// Implementation class not registered in the catalog.
    #[error("{component}: implementation class {class} is not in the catalog")]
    UnknownClass { component: String, class: String },

    /// Interface not registered in the catalog.
    #[error("{component}: interface {interface} is not in the catalog")]
    UnknownInterface { component: String, interface: String },

    /// A declared method has no implementation.
    #[error("{component}: {interface} declares {method} but the implementation does not provide it")]
    MissingMethod {
        component: String,
        interface: String,
        method: String,
    },

    /// A home declares something other than an allowed `create*` method.
    #[error("{component}: home {interface} declares invalid method {method}")]
    InvalidHomeMethod {
        component: String,
        interface: String,
        method: String,
    },

    /// A home was requested for a view the component does not declare.
    #[error("{component} has no {kind} view")]
    NoSuchView {
        component: String,
        kind: InterfaceKind,
    },
}

impl ErrorCode for ProxyError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownClass { .. } => "PROXY_UNKNOWN_CLASS",
            Self::UnknownInterface { .. } => "PROXY_UNKNOWN_INTERFACE",
            Self::MissingMethod { .. } => "PROXY_MISSING_METHOD",
            Self::InvalidHomeMethod { .. } => "PROXY_INVALID_HOME_METHOD",
            Self::NoSuchView { .. } => "PROXY_NO_SUCH_VIEW",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Failure of a client call through a proxy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvocationError {
    /// Raised by bean code; passed through untouched.
    #[error(transparent)]
    Business(#[from] BusinessError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// The method is not declared on the interface the proxy exposes.
    #[error("{component} ({kind}): no such method {method}")]
    NoSuchMethod {
        component: String,
        kind: InterfaceKind,
        method: String,
    },
}

impl InvocationError {
    /// Returns the bean's error if this is a business failure.
    #[must_use]
    pub fn as_business(&self) -> Option<&BusinessError> {
        match self {
            Self::Business(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the lifecycle error if this is a lifecycle failure.
    #[must_use]
    pub fn as_lifecycle(&self) -> Option<&LifecycleError> {
        match self {
            Self::Lifecycle(e) => Some(e),
            _ => None,
        }
    }
}

impl ErrorCode for InvocationError {
    fn code(&self) -> &'static str {
        match self {
            Self::Business(_) => "INVOKE_BUSINESS",
            Self::Lifecycle(_) => "INVOKE_LIFECYCLE",
            Self::Transaction(_) => "INVOKE_TRANSACTION",
            Self::NoSuchMethod { .. } => "INVOKE_NO_SUCH_METHOD",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Lifecycle(e) => e.is_recoverable(),
            Self::Transaction(e) => e.is_recoverable(),
            Self::Business(_) | Self::NoSuchMethod { .. } => false,
        }
    }
}

/// Deployment failure. Nothing stays bound when one is returned.
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("descriptor error: {0}")]
    Parse(#[from] ParseError),

    #[error("naming error: {0}")]
    Naming(#[from] NamingError),

    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),

    /// The container already holds a deployment.
    #[error("container already has an active deployment")]
    AlreadyDeployed,
}

impl ErrorCode for DeploymentError {
    fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "DEPLOY_PARSE",
            Self::Naming(_) => "DEPLOY_NAMING",
            Self::Proxy(_) => "DEPLOY_PROXY",
            Self::AlreadyDeployed => "DEPLOY_ALREADY_DEPLOYED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::TransactionId;
    use tinybean_types::{assert_error_codes, ContainerId};

    fn handle() -> ConversationHandle {
        ConversationHandle::new(ContainerId::new(), 1)
    }

    fn lifecycle_variants() -> Vec<LifecycleError> {
        vec![
            LifecycleError::NoSuchInstance { handle: handle() },
            LifecycleError::AlreadyRemoved { handle: handle() },
            LifecycleError::Instantiation {
                component: "x".into(),
                source: BusinessError::new("X", "x"),
            },
            LifecycleError::PoolExhausted {
                component: "x".into(),
                max_size: 1,
            },
            LifecycleError::Undeployed,
        ]
    }

    fn proxy_variants() -> Vec<ProxyError> {
        vec![
            ProxyError::UnknownClass {
                component: "x".into(),
                class: "y".into(),
            },
            ProxyError::UnknownInterface {
                component: "x".into(),
                interface: "y".into(),
            },
            ProxyError::MissingMethod {
                component: "x".into(),
                interface: "y".into(),
                method: "z/0".into(),
            },
            ProxyError::InvalidHomeMethod {
                component: "x".into(),
                interface: "y".into(),
                method: "z/0".into(),
            },
            ProxyError::NoSuchView {
                component: "x".into(),
                kind: InterfaceKind::Remote,
            },
        ]
    }

    fn invocation_variants() -> Vec<InvocationError> {
        vec![
            InvocationError::Business(BusinessError::new("X", "x")),
            InvocationError::Lifecycle(LifecycleError::Undeployed),
            InvocationError::Transaction(TransactionError::Begin {
                reason: "x".into(),
            }),
            InvocationError::NoSuchMethod {
                component: "x".into(),
                kind: InterfaceKind::Local,
                method: "y/0".into(),
            },
        ]
    }

    fn deployment_variants() -> Vec<DeploymentError> {
        vec![
            DeploymentError::Parse(ParseError::DuplicateComponent { name: "x".into() }),
            DeploymentError::Naming(NamingError::DuplicateBinding { path: "x".into() }),
            DeploymentError::Proxy(proxy_variants().remove(0)),
            DeploymentError::AlreadyDeployed,
        ]
    }

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(&lifecycle_variants(), "LIFECYCLE_");
        assert_error_codes(&proxy_variants(), "PROXY_");
        assert_error_codes(&invocation_variants(), "INVOKE_");
        assert_error_codes(&deployment_variants(), "DEPLOY_");
    }

    #[test]
    fn recoverability() {
        let exhausted = LifecycleError::PoolExhausted {
            component: "Teller".into(),
            max_size: 2,
        };
        assert!(exhausted.is_recoverable());
        assert!(InvocationError::from(exhausted).is_recoverable());
        assert!(!InvocationError::from(BusinessError::new("X", "x")).is_recoverable());
        assert!(!LifecycleError::Undeployed.is_recoverable());
        assert!(!DeploymentError::AlreadyDeployed.is_recoverable());
    }

    #[test]
    fn business_error_is_transparent() {
        let business = BusinessError::new("CART_EMPTY", "nothing to check out");
        let err = InvocationError::from(business.clone());
        assert_eq!(err.to_string(), business.to_string());
        assert_eq!(err.as_business(), Some(&business));
        assert!(err.as_lifecycle().is_none());
    }

    #[test]
    fn transaction_error_keeps_id() {
        let err = InvocationError::from(TransactionError::Commit {
            id: TransactionId::new(7),
            reason: "disk full".into(),
        });
        assert!(err.to_string().contains("tx-7"));
        assert_eq!(err.code(), "INVOKE_TRANSACTION");
    }
}
