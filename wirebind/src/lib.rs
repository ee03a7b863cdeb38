//! Runtime layer for [wirebind_di] containers.
//!
//! [wirebind_di] itself only resolves dependencies and binds arguments. This crate adds the
//! supporting infrastructure an application usually wants around it: configuration loaded from a
//! file and the environment, a default tracing logger, and a [Runtime](runtime::Runtime) which
//! creates and names containers explicitly.
//!
//! ```
//! use wirebind::config::RuntimeConfig;
//! use wirebind::runtime::Runtime;
//! use wirebind_di::instance::TypedComponentResolver;
//! use wirebind_di::qualifiers::Qualifiers;
//! use wirebind_di::type_identity::TypeIdentity;
//!
//! let runtime = Runtime::with_config(RuntimeConfig::new(false, "info")).unwrap();
//! let web = runtime.container("web").unwrap();
//! let db = runtime.container("db").unwrap();
//!
//! db.provide(Qualifiers::provider_default(), || "postgres://localhost".to_string())
//!     .unwrap();
//! web.require_from(&db, TypeIdentity::of::<String>(), Qualifiers::default());
//!
//! let url = web
//!     .instance_typed::<String>(Qualifiers::injector_default())
//!     .unwrap();
//! assert_eq!(*url, "postgres://localhost");
//! ```

pub mod config;
pub mod runtime;
