//! Built-in generator rules, one module per block family.

use super::GeneratorRegistry;

mod components;
mod controls;
mod lists;
mod logic;
mod math;
mod procedures;
mod text;
mod variables;

pub(crate) fn install(registry: &mut GeneratorRegistry) {
    math::install(registry);
    logic::install(registry);
    text::install(registry);
    lists::install(registry);
    controls::install(registry);
    variables::install(registry);
    procedures::install(registry);
    components::install(registry);
}
