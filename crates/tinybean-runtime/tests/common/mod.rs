//! Shared fixtures: the cart demo beans and descriptors.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tinybean_bean::{arg, BeanClass, BusinessError, Catalog, InterfaceDef};

pub const EJB_JAR: &str = include_str!("../../../../demos/cart/ejb-jar.xml");
pub const JBOSS: &str = include_str!("../../../../demos/cart/jboss.xml");

pub const CART_LOCAL_HOME: &str = "ejb/CartLocalHome";
pub const CART_REMOTE_HOME: &str = "ejb/Cart";
pub const TELLER_LOCAL_HOME: &str = "java:comp/env/ejb/TellerLocalHome";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Line {
    pub sku: String,
    pub qty: u32,
    pub price: f64,
}

#[derive(Debug, Default)]
struct CartBean {
    customer: String,
    lines: Vec<Line>,
}

impl CartBean {
    fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| f64::from(l.qty) * l.price)
            .sum()
    }
}

/// Counts calls into the demo beans.
#[derive(Debug, Default, Clone)]
pub struct Probes {
    pub cart_destroyed: Arc<AtomicUsize>,
    pub teller_created: Arc<AtomicUsize>,
    pub teller_in_flight: Arc<AtomicUsize>,
    pub teller_max_in_flight: Arc<AtomicUsize>,
}

impl Probes {
    pub fn cart_destroyed(&self) -> usize {
        self.cart_destroyed.load(Ordering::SeqCst)
    }

    pub fn teller_created(&self) -> usize {
        self.teller_created.load(Ordering::SeqCst)
    }

    pub fn teller_max_in_flight(&self) -> usize {
        self.teller_max_in_flight.load(Ordering::SeqCst)
    }
}

fn cart_interfaces() -> [InterfaceDef; 4] {
    let home = |name: &str| {
        InterfaceDef::new(name)
            .method("create", 1)
            .method("createForGuest", 0)
    };
    let component = |name: &str| {
        InterfaceDef::new(name)
            .method("addItem", 1)
            .method("removeItem", 1)
            .method("getItems", 0)
            .method("getCustomer", 0)
            .method("getTotalAmount", 0)
            .method("checkout", 0)
    };
    [
        home("demo.cart.CartLocalHome"),
        component("demo.cart.CartLocal"),
        home("demo.cart.CartHome"),
        component("demo.cart.Cart"),
    ]
}

fn cart_class(probes: &Probes) -> BeanClass {
    let destroyed = Arc::clone(&probes.cart_destroyed);
    BeanClass::builder("demo.cart.CartBean", CartBean::default)
        .init("create", 1, |cart, args| {
            cart.customer = arg(args, 0)?;
            Ok(())
        })
        .init("createForGuest", 0, |cart, _| {
            cart.customer = "guest".into();
            Ok(())
        })
        .method("addItem", 1, |cart, args| {
            let line: Line = arg(args, 0)?;
            if line.qty == 0 {
                return Err(BusinessError::new("BAD_QUANTITY", "quantity must be positive"));
            }
            cart.lines.push(line);
            Ok(json!(cart.lines.len()))
        })
        .method("removeItem", 1, |cart, args| {
            let sku: String = arg(args, 0)?;
            let before = cart.lines.len();
            cart.lines.retain(|l| l.sku != sku);
            if cart.lines.len() == before {
                return Err(BusinessError::new("ITEM_NOT_FOUND", format!("no item {sku}"))
                    .with_detail(json!({ "sku": sku })));
            }
            Ok(json!(cart.lines.len()))
        })
        .method("getItems", 0, |cart, _| Ok(json!(cart.lines)))
        .method("getCustomer", 0, |cart, _| Ok(json!(cart.customer)))
        .method("getTotalAmount", 0, |cart, _| Ok(json!(cart.total())))
        .method("checkout", 0, |cart, _| {
            if cart.lines.is_empty() {
                return Err(BusinessError::new("CART_EMPTY", "nothing to check out"));
            }
            let total = cart.total();
            cart.lines.clear();
            Ok(json!({ "customer": cart.customer, "charged": total }))
        })
        .on_remove(move |_| {
            destroyed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build()
}

fn teller_class(probes: &Probes) -> BeanClass {
    let created = Arc::clone(&probes.teller_created);
    let in_flight = Arc::clone(&probes.teller_in_flight);
    let max_in_flight = Arc::clone(&probes.teller_max_in_flight);
    BeanClass::builder("demo.teller.TellerBean", || 0_u64)
        .init("create", 0, move |_, _| {
            created.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .method("quote", 2, move |served, args| {
            let qty: u32 = arg(args, 0)?;
            let price: f64 = arg(args, 1)?;
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max_in_flight.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            *served += 1;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(json!(f64::from(qty) * price))
        })
        .method("served", 0, |served, _| Ok(json!(*served)))
        .build()
}

/// Catalog holding the cart demo.
pub fn catalog(probes: &Probes) -> Catalog {
    let mut catalog = Catalog::new();
    for iface in cart_interfaces() {
        catalog.register_interface(iface);
    }
    catalog
        .with_interface(InterfaceDef::new("demo.teller.TellerLocalHome").method("create", 0))
        .with_interface(
            InterfaceDef::new("demo.teller.TellerLocal")
                .method("quote", 2)
                .method("served", 0),
        )
        .with_class(cart_class(probes))
        .with_class(teller_class(probes))
}

pub fn line(sku: &str, qty: u32, price: f64) -> serde_json::Value {
    json!({ "sku": sku, "qty": qty, "price": price })
}
