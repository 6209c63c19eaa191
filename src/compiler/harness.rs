//! Contract checks for generator rules: build a single block of a type in a
//! headless workspace, generate it and inspect the output.

use std::sync::Arc;

use tracing::warn;

use super::{Fragment, Order, YailGenerator};
use crate::blocks::{BlockCatalog, Workspace};
use crate::error::GraphError;

#[derive(Debug, Clone)]
pub struct GeneratorHarness {
    catalog: Arc<BlockCatalog>,
    generator: YailGenerator,
}

impl Default for GeneratorHarness {
    fn default() -> Self {
        Self::new(Arc::new(BlockCatalog::builtin()), YailGenerator::default())
    }
}

impl GeneratorHarness {
    pub fn new(catalog: Arc<BlockCatalog>, generator: YailGenerator) -> Self {
        GeneratorHarness { catalog, generator }
    }

    /// Generates a freshly created, unconnected block of `block_type`.
    pub fn generate_block(&self, block_type: &str) -> Result<Fragment, GraphError> {
        let mut workspace = Workspace::new(self.catalog.clone());
        let block = workspace.create_block(block_type)?;
        Ok(self.generator.generate(&workspace, block))
    }

    /// True when the generated code contains `expected` and, for
    /// value-returning blocks, binds atomically.
    pub fn generator_test(&self, block_type: &str, expected: &str, does_return: bool) -> bool {
        match self.generate_block(block_type) {
            Ok(fragment) => {
                fragment.code.contains(expected) && (!does_return || fragment.order == Order::Atomic)
            }
            Err(e) => {
                warn!("generator test for '{}' failed: {}", block_type, e);
                false
            }
        }
    }
}

/// [`GeneratorHarness::generator_test`] with the built-in catalog and rules.
pub fn generator_test(block_type: &str, expected: &str, does_return: bool) -> bool {
    GeneratorHarness::default().generator_test(block_type, expected, does_return)
}
