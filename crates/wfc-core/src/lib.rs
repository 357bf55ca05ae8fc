//! Readers for electronic-structure wavefunction coefficients.
//!
//! The centerpiece is [`WfsxStore`], a random-access reader over SIESTA's
//! Fortran-record `.WFSX` files. [`AbacusStore`] and [`HamnetStore`] expose
//! the same queries for ABACUS LCAO text output and HamNet `.npy` arrays, and
//! [`open_source`] picks one from a [`SourceConfig`].

pub mod common;
pub mod domain;
pub mod modules;

pub use common::SourceConfig;
pub use domain::{
    BandSelector, CoefficientVector, IndexDimension, SourceFormat, SourceSummary,
    StoreDimensions, WfcError, WfcErrorCategory, WfcResult,
};
pub use modules::{AbacusStore, HamnetStore, WavefunctionSource, WfsxStore, open_source};
