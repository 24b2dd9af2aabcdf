//! Concrete automata.
//!
//! Each variant wraps an [`AutomatonCore`](crate::automaton::AutomatonCore)
//! and supplies its rule, pattern catalogue and colormap.

pub mod brians_brain;
pub mod cyclic;
pub mod elementary;
pub mod langton;
pub mod life;
pub mod von_neumann;
pub mod wireworld;

pub use brians_brain::BriansBrain;
pub use cyclic::CyclicAutomaton;
pub use elementary::ElementaryAutomaton;
pub use langton::LangtonLoop;
pub use life::{LifeFlavor, LifeLike};
pub use von_neumann::{ConstructorFlavor, VonNeumannConstructor};
pub use wireworld::WireWorld;
