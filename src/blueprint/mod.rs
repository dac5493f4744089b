//! Blueprint layers: painted cells refined by a modifier pipeline
//!
//! A blueprint layer owns two cell sets:
//! 1. `paint_grid`: cells placed by hand or by other layers
//! 2. `all_positions`: the pipeline output consumed by build layers

pub mod layer;
pub mod modifier;
pub mod modifiers;
pub mod generators;

pub use layer::{BlueprintLayer, PipelineOutput};
pub use modifier::{BlueprintModifier, Modifier, ModifierContext, ModifierStep, SideEffect, run_pipeline};
