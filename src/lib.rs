//! In-silico PCR: locate primer binding sites in template sequences and
//! predict the amplicons a primer pair would produce.
//!
//! The pipeline has four stages:
//!
//! 1. [`iupac`] compiles IUPAC-ambiguous primers into per-position base masks
//! 2. [`matcher`] finds approximate occurrences of a compiled primer under an
//!    edit-distance budget, reporting substitution/insertion/deletion counts
//! 3. [`orientation`] searches every template with both primers and their
//!    reverse complements
//! 4. [`assembler`] pairs compatible hits into amplicons, falling back to
//!    edge-anchored amplicons for incomplete templates
//!
//! [`engine::simulate`] runs the whole thing over a template set in parallel.

pub mod assembler;
pub mod config;
pub mod engine;
pub mod error;
pub mod iupac;
pub mod matcher;
pub mod orientation;
pub mod report;
pub mod templates;

pub use assembler::{Amplicon, AmpliconOrientation, PrimerEvidence};
pub use config::PcrConfig;
pub use engine::{simulate, PcrRun, Simulation};
pub use error::{PcrError, Result};
pub use iupac::{compile, reverse_complement, Pattern};
pub use matcher::{find_matches, Match};
pub use orientation::{PrimerOrientation, PrimerPair, TemplateHits};
pub use templates::{load_templates, Template};
