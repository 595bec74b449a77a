//! Deploy / undeploy behaviour of the container.

mod common;

use common::{catalog, line, Probes, CART_LOCAL_HOME, CART_REMOTE_HOME, EJB_JAR, JBOSS, TELLER_LOCAL_HOME};
use serde_json::json;
use std::sync::Arc;
use tinybean_descriptor::ParseError;
use tinybean_naming::{EntryKind, Lookup, NamingError, VendorResolver};
use tinybean_runtime::config::ContainerConfig;
use tinybean_runtime::{Container, DeploymentError, LifecycleError, NoopCoordinator, ProxyError};

fn container() -> (Container, Probes) {
    let probes = Probes::default();
    (Container::with_catalog(catalog(&probes)), probes)
}

fn deploy_demo(container: &Container) -> usize {
    let mut vendor = JBOSS.as_bytes();
    container
        .deploy(EJB_JAR.as_bytes(), Some(&mut vendor))
        .expect("demo deploys")
}

// ── Round trip ──────────────────────────────────────────────────────

#[test]
fn deploy_binds_every_home_and_undeploy_unbinds_them() {
    let (container, _) = container();
    assert_eq!(deploy_demo(&container), 3);
    assert!(container.is_deployed());

    let mut paths = container.registry().paths();
    paths.sort();
    assert_eq!(paths, vec![CART_REMOTE_HOME, CART_LOCAL_HOME, TELLER_LOCAL_HOME]);

    let bindings = container.bindings();
    assert_eq!(bindings.len(), 3);
    assert!(bindings.iter().any(|b| b.path == TELLER_LOCAL_HOME && b.component == "Teller"));

    assert!(container.undeploy());
    assert!(!container.is_deployed());
    assert!(container.registry().is_empty());
    assert!(container.bindings().is_empty());
    assert!(container.deployment().is_none());
    assert!(!container.undeploy());
}

#[test]
fn contexts_list_their_children() {
    let (container, _) = container();
    deploy_demo(&container);

    let Lookup::Context(entries) = container.lookup("ejb").expect("context") else {
        panic!("ejb should be a context");
    };
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Cart", "CartLocalHome"]);
    assert!(entries.iter().all(|e| e.kind == EntryKind::Binding));
    assert_eq!(container.registry().list("ejb").expect("context"), entries);

    assert!(matches!(
        container.lookup_home("ejb"),
        Err(NamingError::NotABinding { .. })
    ));
    // nothing lies below a bound home
    assert!(matches!(
        container.lookup_home("ejb/CartLocalHome/extra"),
        Err(NamingError::NameNotFound { .. })
    ));
}

#[test]
fn lookup_canonicalises_paths() {
    let (container, _) = container();
    deploy_demo(&container);

    let home = container.lookup_home("/ejb//CartLocalHome/").expect("same binding");
    assert_eq!(home.component(), "Cart");
}

#[test]
fn deployment_is_retained_while_active() {
    let (container, _) = container();
    deploy_demo(&container);

    let deployment = container.deployment().expect("active");
    assert_eq!(deployment.len(), 2);
    assert!(deployment.component("Cart").expect("cart").is_stateful());
}

// ── Failed deploys ──────────────────────────────────────────────────

#[test]
fn duplicate_component_fails_without_bindings() {
    let (container, _) = container();
    let jar = r#"<ejb-jar><enterprise-beans>
        <session>
            <ejb-name>Teller</ejb-name>
            <local-home>demo.teller.TellerLocalHome</local-home>
            <local>demo.teller.TellerLocal</local>
            <ejb-class>demo.teller.TellerBean</ejb-class>
            <session-type>Stateless</session-type>
        </session>
        <session>
            <ejb-name>Teller</ejb-name>
            <local-home>demo.teller.TellerLocalHome</local-home>
            <local>demo.teller.TellerLocal</local>
            <ejb-class>demo.teller.TellerBean</ejb-class>
            <session-type>Stateless</session-type>
        </session>
    </enterprise-beans></ejb-jar>"#;

    let err = container.deploy(jar.as_bytes(), None).expect_err("duplicate");
    assert!(matches!(
        err,
        DeploymentError::Parse(ParseError::DuplicateComponent { ref name }) if name == "Teller"
    ));
    assert!(container.registry().is_empty());
    assert!(!container.is_deployed());
}

#[test]
fn malformed_descriptor_is_a_parse_error() {
    let (container, _) = container();
    let err = container
        .deploy("<ejb-jar><enterprise-beans>".as_bytes(), None)
        .expect_err("truncated");
    assert!(matches!(err, DeploymentError::Parse(_)));
    assert!(container.registry().is_empty());
}

#[test]
fn colliding_paths_roll_back_the_whole_deploy() {
    let (container, probes) = container();
    let jar = r#"<ejb-jar><enterprise-beans>
        <session>
            <ejb-name>TellerA</ejb-name>
            <local-home>demo.teller.TellerLocalHome</local-home>
            <local>demo.teller.TellerLocal</local>
            <ejb-class>demo.teller.TellerBean</ejb-class>
            <session-type>Stateless</session-type>
        </session>
        <session>
            <ejb-name>TellerB</ejb-name>
            <local-home>demo.teller.TellerLocalHome</local-home>
            <local>demo.teller.TellerLocal</local>
            <ejb-class>demo.teller.TellerBean</ejb-class>
            <session-type>Stateless</session-type>
        </session>
    </enterprise-beans></ejb-jar>"#;

    // both fall back to the same conventional path
    let err = container.deploy(jar.as_bytes(), None).expect_err("collision");
    assert!(matches!(
        err,
        DeploymentError::Naming(NamingError::DuplicateBinding { ref path }) if path == TELLER_LOCAL_HOME
    ));
    assert!(container.registry().is_empty());
    assert!(!container.is_deployed());
    assert_eq!(probes.teller_created(), 0);

    // the container is still usable
    assert_eq!(deploy_demo(&container), 3);
}

#[test]
fn catalog_mismatch_is_a_proxy_error() {
    let (container, _) = container();
    let jar = r#"<ejb-jar><enterprise-beans><session>
        <ejb-name>Ghost</ejb-name>
        <local-home>demo.teller.TellerLocalHome</local-home>
        <local>demo.teller.TellerLocal</local>
        <ejb-class>demo.GhostBean</ejb-class>
        <session-type>Stateless</session-type>
    </session></enterprise-beans></ejb-jar>"#;

    let err = container.deploy(jar.as_bytes(), None).expect_err("unknown class");
    assert!(matches!(
        err,
        DeploymentError::Proxy(ProxyError::UnknownClass { ref class, .. }) if class == "demo.GhostBean"
    ));
    assert!(container.registry().is_empty());
}

#[test]
fn second_deploy_is_refused_while_active() {
    let (container, _) = container();
    deploy_demo(&container);
    let before = container.registry().paths();

    let mut vendor = JBOSS.as_bytes();
    let err = container
        .deploy(EJB_JAR.as_bytes(), Some(&mut vendor))
        .expect_err("already deployed");
    assert!(matches!(err, DeploymentError::AlreadyDeployed));
    assert_eq!(container.registry().paths(), before);
}

// ── Undeploy ────────────────────────────────────────────────────────

#[test]
fn undeploy_destroys_instances_and_invalidates_proxies() {
    let (container, probes) = container();
    deploy_demo(&container);
    let home = container.lookup_home(CART_LOCAL_HOME).expect("bound");
    let first = home.create(&[json!("alice")]).expect("create");
    let _second = home.create(&[json!("bob")]).expect("create");
    first.invoke("addItem", &[line("A-1", 1, 1.0)]).expect("add");

    let teller = container
        .lookup_home(TELLER_LOCAL_HOME)
        .expect("bound")
        .create(&[])
        .expect("create");

    assert!(container.undeploy());
    assert_eq!(probes.cart_destroyed(), 2);

    let undeployed = Some(&LifecycleError::Undeployed);
    assert_eq!(first.invoke("getItems", &[]).expect_err("gone").as_lifecycle(), undeployed);
    assert_eq!(first.remove().expect_err("gone").as_lifecycle(), undeployed);
    assert_eq!(home.create(&[json!("carol")]).expect_err("gone").as_lifecycle(), undeployed);
    assert_eq!(
        teller.invoke("served", &[]).expect_err("gone").as_lifecycle(),
        undeployed
    );
    assert!(matches!(
        container.lookup_home(CART_LOCAL_HOME),
        Err(NamingError::NameNotFound { .. })
    ));
}

#[test]
fn handles_are_not_reused_across_redeploys() {
    let (container, _) = container();
    deploy_demo(&container);
    let stale = container
        .lookup_home(CART_LOCAL_HOME)
        .expect("bound")
        .create(&[json!("alice")])
        .expect("create");
    let stale_handle = stale.handle().expect("stateful");
    assert!(container.undeploy());

    deploy_demo(&container);
    let fresh = container
        .lookup_home(CART_LOCAL_HOME)
        .expect("bound")
        .create(&[json!("bob")])
        .expect("create");
    let fresh_handle = fresh.handle().expect("stateful");

    assert_ne!(stale_handle, fresh_handle);
    assert!(fresh_handle.seq() > stale_handle.seq());
    assert_eq!(fresh_handle.container(), container.id());

    // the new manager never issued the old handle
    let manager = container.lifecycle().expect("deployed");
    assert_eq!(manager.state(&stale_handle), None);
    assert_eq!(
        stale.invoke("getItems", &[]).expect_err("old deployment").as_lifecycle(),
        Some(&LifecycleError::Undeployed)
    );
}

#[test]
fn dropping_the_container_undeploys() {
    let probes = Probes::default();
    let proxy = {
        let container = Container::with_catalog(catalog(&probes));
        deploy_demo(&container);
        container
            .lookup_home(CART_LOCAL_HOME)
            .expect("bound")
            .create(&[json!("alice")])
            .expect("create")
    };

    assert_eq!(probes.cart_destroyed(), 1);
    assert!(matches!(
        proxy.invoke("getItems", &[]).expect_err("dropped").as_lifecycle(),
        Some(LifecycleError::Undeployed)
    ));
}

// ── Naming strategies ───────────────────────────────────────────────

#[test]
fn vendor_resolver_applies_without_a_vendor_stream() {
    let probes = Probes::default();
    let mut container = Container::with_catalog(catalog(&probes));
    container.set_resolver(VendorResolver::from_descriptor(JBOSS.as_bytes()).expect("valid"));

    assert_eq!(container.deploy(EJB_JAR.as_bytes(), None).expect("deploys"), 3);
    assert_eq!(container.lookup_home(CART_LOCAL_HOME).expect("bound").component(), "Cart");
    assert_eq!(container.lookup_home(CART_REMOTE_HOME).expect("bound").component(), "Cart");
    assert!(container.lookup_home(TELLER_LOCAL_HOME).is_ok());
}

#[test]
fn convention_alone_uses_the_home_interface_name() {
    let (container, _) = container();
    container.deploy(EJB_JAR.as_bytes(), None).expect("deploys");

    let mut paths = container.registry().paths();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "java:comp/env/ejb/CartHome",
            "java:comp/env/ejb/CartLocalHome",
            "java:comp/env/ejb/TellerLocalHome",
        ]
    );
}

#[test]
fn configured_scope_prefix_shapes_conventional_paths() {
    let probes = Probes::default();
    let mut config = ContainerConfig::default();
    config.naming.scope_prefix = "app".into();
    let container = Container::new(config, catalog(&probes), Arc::new(NoopCoordinator::new()));
    deploy_demo(&container);

    // explicit names are untouched by the prefix
    assert!(container.lookup_home(CART_LOCAL_HOME).is_ok());
    assert_eq!(
        container.lookup_home("app/ejb/TellerLocalHome").expect("bound").component(),
        "Teller"
    );
}

#[test]
fn installed_vendor_resolver_inherits_configured_prefix() {
    let probes = Probes::default();
    let mut config = ContainerConfig::default();
    config.naming.scope_prefix = "app".into();
    let mut container = Container::new(config, catalog(&probes), Arc::new(NoopCoordinator::new()));
    container.set_resolver(VendorResolver::from_descriptor(JBOSS.as_bytes()).expect("valid"));

    container.deploy(EJB_JAR.as_bytes(), None).expect("deploys");
    let mut paths = container.registry().paths();
    paths.sort();
    assert_eq!(paths, vec![CART_REMOTE_HOME, CART_LOCAL_HOME, "app/ejb/TellerLocalHome"]);
}

#[test]
fn explicit_vendor_prefix_beats_configured_one() {
    let probes = Probes::default();
    let mut config = ContainerConfig::default();
    config.naming.scope_prefix = "app".into();
    let mut container = Container::new(config, catalog(&probes), Arc::new(NoopCoordinator::new()));
    container.set_resolver(
        VendorResolver::from_descriptor(JBOSS.as_bytes())
            .expect("valid")
            .with_scope_prefix("fixed"),
    );

    container.deploy(EJB_JAR.as_bytes(), None).expect("deploys");
    assert!(container.lookup_home("fixed/ejb/TellerLocalHome").is_ok());
    assert!(container.lookup_home("app/ejb/TellerLocalHome").is_err());
}
