//! Runtime orchestration for the tactical combat simulation.
//!
//! This crate wires the pure simulation in skirmish-core together with the
//! data loaded by skirmish-content and drives a match from a synchronous
//! per-frame tick. Consumers embed [`MatchSession`], feed it a frame delta,
//! and drain its events for presentation.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the match orchestrator and its activity machine
//! - [`command`] defines turn commands and the provider abstraction
//! - [`targeting`] paints release-range and area overlays for aiming
pub mod command;
pub mod error;
pub mod session;
pub mod targeting;

pub use command::{AiController, Command, CommandProvider, TurnView};
pub use error::{Result, SessionError};
pub use session::MatchSession;
pub use targeting::{Targeting, release_candidates};
