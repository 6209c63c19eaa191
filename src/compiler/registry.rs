use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{Fragment, Yail, rules};
use crate::blocks::Block;
use crate::error::RegistryError;

/// Lowers one block into Yail. Rules read their children through the
/// [`Yail`] context.
pub type Rule = Arc<dyn Fn(&Yail<'_>, &Block) -> Fragment + Send + Sync>;

/// A collection mapping block type tags to rules.
pub type RuleCollection = BTreeMap<String, Rule>;

/// The registry is the open set of generator rules, keyed by block type.
/// It is populated at startup. Extensions add entries with
/// [`register`](Self::register).
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    rules: RuleCollection,
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the rules for every built-in block type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        rules::install(&mut registry);
        registry
    }

    /// Adds a rule for a block type.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Duplicate`] if the type already has a rule. Use
    /// [`replace`](Self::replace) to override on purpose.
    pub fn register<F>(&mut self, block_type: &str, rule: F) -> Result<(), RegistryError>
    where
        F: Fn(&Yail<'_>, &Block) -> Fragment + Send + Sync + 'static,
    {
        if self.rules.contains_key(block_type) {
            return Err(RegistryError::Duplicate(block_type.to_string()));
        }
        self.rules.insert(block_type.to_string(), Arc::new(rule));
        Ok(())
    }

    /// Installs a rule, returning the one it overrides.
    pub fn replace<F>(&mut self, block_type: &str, rule: F) -> Option<Rule>
    where
        F: Fn(&Yail<'_>, &Block) -> Fragment + Send + Sync + 'static,
    {
        self.rules.insert(block_type.to_string(), Arc::new(rule))
    }

    pub fn remove(&mut self, block_type: &str) -> Option<Rule> {
        self.rules.remove(block_type)
    }

    pub fn get(&self, block_type: &str) -> Option<&Rule> {
        self.rules.get(block_type)
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.rules.contains_key(block_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}
