//! Transaction execution and call-frame dispatch for the fast virtual machine.
//!
//! The bytecode interpreter itself is external. This crate admits transactions, pre-charges
//! them, opens the root frame, and services every nested `CALL`/`CREATE`, self-destruct and log
//! emitted by the interpreter through the [`Host`] it hands out.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod config;
pub use config::*;

mod context;
pub use context::*;

mod dispatcher;
pub use dispatcher::*;

mod error;
pub use error::*;

mod executor;
pub use executor::*;

mod external;
pub use external::*;

mod frame;
pub use frame::*;

mod hardfork;
pub use hardfork::*;

mod host;
pub use host::*;

mod ledger;
pub use ledger::*;

mod message;
pub use message::*;

mod result;
pub use result::*;

mod spec;
pub use spec::*;

mod state;
pub use state::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod types;
pub use types::*;

mod validation;
pub use validation::*;
