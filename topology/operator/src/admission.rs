//! Admission of [`ShovelCrd`] create and update requests.
//!
//! A request goes through [`default_spec`], then [`validate`]. The accepted resource is what gets
//! persisted, and what the reconciler reads from then on, it is never validated again.
//!
//! Everything here is a pure function of its input, requests for unrelated resources can be
//! admitted concurrently.

use std::mem;

use kube::Resource;
use tracing::warn;

use crate::crd::ShovelCrd;

pub mod config;
pub mod defaults;
pub mod error;
pub mod validate;

pub use self::{
    config::{AdmissionConfig, ErrorReporting},
    defaults::{default_spec, DEFAULT_VHOST},
    error::{AdmissionError, AdmissionResult, FieldError, FieldErrors, FieldPath},
    validate::{validate, validate_identity},
};

/// Runs defaulting and validation over [`ShovelCrd`] requests.
#[derive(Clone, Debug, Default)]
pub struct ShovelAdmission {
    config: AdmissionConfig,
}

impl ShovelAdmission {
    pub fn new(config: AdmissionConfig) -> Self {
        ShovelAdmission { config }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Admits a new resource, returning it with its defaults filled in.
    #[tracing::instrument(level = "debug", skip_all, fields(shovel = ?shovel.metadata.name), err)]
    pub fn create(&self, mut shovel: ShovelCrd) -> AdmissionResult<ShovelCrd> {
        let spec = default_spec(mem::take(&mut shovel.spec));

        shovel.spec = validate(spec).map_err(|errors| {
            let errors = self.config.error_reporting.apply(errors);
            warn!(%errors, "rejected shovel");

            AdmissionError::Invalid {
                kind: kind_name(),
                name: resource_name(&shovel),
                errors,
            }
        })?;

        Ok(shovel)
    }

    /// Admits a change to `old`.
    ///
    /// `new` has to pass [`ShovelAdmission::create`], and may not change the name, vhost or
    /// cluster of the shovel.
    #[tracing::instrument(level = "debug", skip_all, fields(shovel = ?new.metadata.name), err)]
    pub fn update(&self, old: &ShovelCrd, new: ShovelCrd) -> AdmissionResult<ShovelCrd> {
        let new = self.create(new)?;
        let old_spec = default_spec(old.spec.clone());

        validate_identity(&old_spec, &new.spec).map_err(|error| {
            warn!(%error, "rejected shovel update");

            AdmissionError::Forbidden {
                resource: resource_plural_name(),
                name: resource_name(&new),
                errors: error.into(),
            }
        })?;

        Ok(new)
    }
}

/// `Shovel.rabbitmq.com`
fn kind_name() -> String {
    format!("{}.{}", ShovelCrd::kind(&()), ShovelCrd::group(&()))
}

/// `shovels.rabbitmq.com`
fn resource_plural_name() -> String {
    format!("{}.{}", ShovelCrd::plural(&()), ShovelCrd::group(&()))
}

fn resource_name(shovel: &ShovelCrd) -> String {
    shovel.metadata.name.clone().unwrap_or_default()
}
