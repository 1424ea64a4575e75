//! Utilities shared by classdiff tests.
//!
//! Class models are assembled from Java-like source snippets so fixtures
//! stay readable:
//!
//! ```
//! use classdiff_test_utils::{class, method, stmt};
//!
//! let model = class("com.acme.Account")
//!     .field("private int balance")
//!     .method(method("public void deposit(int amount)").body(vec![
//!         stmt("validate(amount);"),
//!         stmt("balance += amount;"),
//!     ]))
//!     .build();
//! assert_eq!(model.operations[0].signature(), "deposit(int)");
//! ```
//!
//! Invocations and local variable declarations of each statement are derived
//! from its text; see [`stmt`] and [`compound`].

mod builders;
mod statements;

pub use builders::{class, constructor, method, ClassBuilder, OperationBuilder};
pub use statements::{compound, declaration_in, invocations_in, stmt};
