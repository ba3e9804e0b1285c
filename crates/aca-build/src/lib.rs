//! Local image builds for aca-deploy.
//!
//! # Build pipeline
//!
//! ```text
//! app source + registry
//!   1. Names      ── ImageNames::resolve (explicit, else <registry>/<repo>:<id>.<number>)
//!   2. Strategy   ── explicit Dockerfile → <root>/Dockerfile → builder
//!   3a. Dockerfile ── <cli> build --file ... --tag ... [--build-arg k=v]... <src>
//!   3b. Builder    ── pack build against each candidate builder image until one succeeds
//!   4. Push       ── <cli> push <image>
//! ```
//!
//! A failed build never reaches the push step.

pub mod builder;
pub mod images;

pub use builder::{BuildError, BuildKind, ImageBuilder};
pub use images::ImageNames;
