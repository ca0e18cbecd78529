//! Host driver over the simulation core.
//!
//! Wires a [`sim_core::World`], a turn queue, and the coroutine runner
//! into a single step-driven [`Simulation`] the host calls once per frame.
//! Rendering, input devices, and persistence stay on the host side; this
//! crate only decides whose turn it is, runs action scripts, and forwards
//! events.

mod actor;
mod error;
mod event;
mod simulation;

pub use actor::Actor;
pub use error::{Result, RuntimeError};
pub use event::RuntimeEvent;
pub use simulation::{RuntimeConfig, Simulation, StepReport};

/// Installs a stderr `tracing` subscriber filtered by `RUST_LOG`.
///
/// Convenience for binaries and tests; a host embedding this crate in a
/// larger application should install its own subscriber instead.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
