//! Fork-join driver tying primer search and amplicon assembly together.
//!
//! Templates are independent: each one is searched in four orientations
//! and assembled on its own worker, and results are gathered back in
//! template input order before anything is reported.

use crate::assembler::{assemble_all, Amplicon};
use crate::config::PcrConfig;
use crate::error::Result;
use crate::orientation::{search_all, PrimerPair, TemplateHits};
use crate::templates::Template;
use log::info;

/// Everything a run produced: per-template hits and the amplicons built from them
#[derive(Debug, Clone)]
pub struct PcrRun {
    pub hits: Vec<TemplateHits>,
    pub amplicons: Vec<Amplicon>,
}

/// A configured simulation over a fixed set of templates and primers.
///
/// [`Simulation::run`] does both stages at once; callers that want to
/// report primer hits even when no amplicon is found can call
/// [`Simulation::search`] and [`Simulation::assemble`] separately.
pub struct Simulation<'a> {
    templates: &'a [Template],
    primers: &'a PrimerPair,
    config: PcrConfig,
}

impl<'a> Simulation<'a> {
    pub fn new(templates: &'a [Template], primers: &'a PrimerPair, config: PcrConfig) -> Self {
        Self {
            templates,
            primers,
            config,
        }
    }

    /// Primer hits for every template, in template order
    pub fn search(&self) -> Vec<TemplateHits> {
        info!(
            "Searching {} template(s) for primers in four orientations (max errors: {})",
            self.templates.len(),
            self.config.max_errors
        );
        search_all(self.templates, self.primers, self.config.max_errors)
    }

    /// Amplicons from previously computed hits; fails when there are none
    pub fn assemble(&self, hits: &[TemplateHits]) -> Result<Vec<Amplicon>> {
        assemble_all(self.templates, hits, &self.config)
    }

    pub fn run(&self) -> Result<PcrRun> {
        let hits = self.search();
        let amplicons = self.assemble(&hits)?;
        Ok(PcrRun { hits, amplicons })
    }
}

/// Run a complete simulation.
pub fn simulate(
    templates: &[Template],
    primers: &PrimerPair,
    config: &PcrConfig,
) -> Result<PcrRun> {
    Simulation::new(templates, primers, *config).run()
}
