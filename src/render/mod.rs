//! Host-facing output of build layers.
//!
//! Build layers never touch a scene graph. They emit [`RenderInstruction`]s
//! which a [`Renderer`] applies to whatever the host uses for instances.

pub mod instruction;
pub mod recording;

pub use instruction::{Collider, ObjectInstance, RenderInstruction, TileInstance};
pub use recording::{RecordingRenderer, RenderedCluster};

/// Consumer of render instructions.
pub trait Renderer {
    /// Apply one instruction.
    fn apply(&mut self, instruction: &RenderInstruction);

    /// Apply instructions in emission order.
    fn apply_all(&mut self, instructions: &[RenderInstruction]) {
        for instruction in instructions {
            self.apply(instruction);
        }
    }
}
