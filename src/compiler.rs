//! Lowering block trees into Yail.
//!
//! Each block type has a rule in the [`GeneratorRegistry`]. Rules produce
//! [`Fragment`]s tagged with an [`Order`], which tells the parent rule
//! whether the code must be wrapped in `(begin …)` before it is embedded.
//! The [`bundle`] module assembles the roots of a workspace into a
//! [`CodeBundle`] ready to be sent to a companion.

mod order;
pub use order::{Fragment, Order};

mod registry;
pub use registry::{GeneratorRegistry, Rule, RuleCollection};

pub mod yail;
pub use yail::{Yail, YailGenerator};

mod rules;

pub mod bundle;
pub use bundle::{CodeBundle, CodeUnit, UnitKind, Warning, assemble};

pub mod harness;
pub use harness::{GeneratorHarness, generator_test};
