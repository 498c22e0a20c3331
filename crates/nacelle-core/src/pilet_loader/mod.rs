//! # Nacelle Core Pilet Loader
//!
//! Infrastructure for discovering, fetching and activating pilets. It owns
//! the entire loading lifecycle: descriptor feeds, loader selection,
//! per-pilet state tracking, lifecycle hook invocation, scheduling
//! strategies and failure isolation between pilets.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`descriptor`]**: Pilet metadata ([`PiletDescriptor`]) and feed
//!   parsing ([`PiletFeed`]).
//! - **[`traits`]**: The collaborator seams: the [`Pilet`] lifecycle trait,
//!   the injected [`PiletLoader`] and [`FeedSource`] I/O seams, plus the
//!   in-tree static loader and file feed used by the CLI and tests.
//! - **[`hooks`]**: Host-supplied lifecycle callbacks fired around setup and
//!   teardown.
//! - **[`strategy`]**: The scheduling policy for a whole pilet list.
//! - **[`pipeline`]**: The state machine driving each pilet from
//!   `Discovered` to a terminal state, under the configured strategy.
//! - **[`error`]**: Error types (e.g. [`PiletSystemError`](error::PiletSystemError))
//!   for loading operations.

pub mod descriptor;
pub mod error;
pub mod hooks;
pub mod pipeline;
pub mod strategy;
pub mod traits;

pub use descriptor::{PiletDescriptor, PiletFeed};
pub use error::PiletSystemError;
pub use hooks::LifecycleHooks;
pub use pipeline::{FailedPilet, LoadOutcome, LoadedPilet, PiletPipeline, PiletState};
pub use strategy::LoadingStrategy;
pub use traits::{FeedSource, FileFeedSource, Pilet, PiletLoader, StaticFeedSource, StaticPiletLoader};

// Test module declaration
#[cfg(test)]
mod tests;
