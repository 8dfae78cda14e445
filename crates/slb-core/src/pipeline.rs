//! Run pipeline
//!
//! catalog → validation → vendor gate → running-only restriction → plan →
//! scripts. Each stage consumes the previous stage's output read-only; the
//! run stops at the first stage that fails.

use crate::config::{EngineConfig, RunConfig};
use crate::error::RunError;
use slb_catalog::{
    FileProbe, FilterTable, MetadataSource, ServiceCatalog, ServiceKey, ServiceStore, StatusProvider,
};
use slb_plan::{ActionPlan, BatchScriptRenderer, PlanBuilder, PlanOutcome, ScriptRenderer, ScriptWriter};
use slb_resolve::{
    ConflictCategory, ConflictReport, ConflictValidator, DependencyResolver, DependencyTree,
    DisableSet, ServiceSelection,
};
use slb_vendor::{VendorClassifier, VendorGate};
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Everything a run reads from the target machine
pub trait TargetSystem: ServiceStore + StatusProvider + FileProbe + MetadataSource {}

impl<T> TargetSystem for T where T: ServiceStore + StatusProvider + FileProbe + MetadataSource {}

/// Default script output root
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Switches for a plan run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Only disable services that are running right now
    pub disable_running: bool,

    /// Skip the vendor gate
    pub suppress_vendor_warning: bool,

    /// Root directory for build output
    pub output_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            disable_running: false,
            suppress_vendor_warning: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl RunOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With running-only restriction
    #[inline]
    #[must_use]
    pub fn with_disable_running(mut self, enabled: bool) -> Self {
        self.disable_running = enabled;
        self
    }

    /// With vendor gate suppressed
    #[inline]
    #[must_use]
    pub fn with_suppress_vendor_warning(mut self, suppressed: bool) -> Self {
        self.suppress_vendor_warning = suppressed;
        self
    }

    /// With output root
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Successful end of a plan run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to change; no scripts written
    NoChanges,

    /// Scripts written
    Written {
        /// Build directory holding both scripts
        build_dir: PathBuf,
        /// Plan the scripts were rendered from
        plan: ActionPlan,
    },
}

/// Build and write the disable/enable scripts for a config
pub fn run_plan<T: TargetSystem>(
    system: &T,
    config: &RunConfig,
    options: &RunOptions,
) -> Result<RunOutcome, RunError> {
    let engine = &config.engine;
    let drive_letter = engine.drive_letter()?;

    let catalog = ServiceCatalog::load(system, &engine.type_table())?;
    let disable_set = validate(&catalog, config)?;

    if options.suppress_vendor_warning {
        debug!("vendor gate suppressed");
    } else {
        check_vendors(system, engine, &catalog, &disable_set)?;
    }

    let disable_set = if options.disable_running {
        let running = disable_set.retain_running(&catalog, system)?;
        debug!(before = disable_set.len(), after = running.len(), "restricted to running services");
        running
    } else {
        disable_set
    };

    let filters = FilterTable::load(system)?;
    let outcome = PlanBuilder::new(&catalog, &filters, system)
        .with_system_drive(engine.system_drive.as_str())
        .build(&disable_set, &config.rename_targets());

    let PlanOutcome::Ready(plan) = outcome else {
        return Ok(RunOutcome::NoChanges);
    };

    let scripts = BatchScriptRenderer::new(crate::VERSION)
        .with_drive_letter(drive_letter)
        .render_plan(&plan);
    let build_dir = ScriptWriter::new(&options.output_dir).write_now(&scripts)?;

    Ok(RunOutcome::Written { build_dir, plan })
}

/// Validate the config's selection, logging every conflict
pub fn validate(catalog: &ServiceCatalog, config: &RunConfig) -> Result<DisableSet, RunError> {
    let resolver = DependencyResolver::new(catalog);
    let selection = ServiceSelection::from_names(
        catalog,
        &config.enabled_services,
        &config.individual_disabled_services,
    );

    ConflictValidator::new(&resolver)
        .validate(&selection)
        .into_result()
        .map_err(|report| {
            log_conflicts(catalog, &report);
            RunError::Conflict(report)
        })
}

fn log_conflicts(catalog: &ServiceCatalog, report: &ConflictReport) {
    for diagnostic in report.diagnostics(catalog) {
        match diagnostic.category {
            ConflictCategory::MissingDependency | ConflictCategory::RequiredBy => {
                error!("{}", diagnostic.message);
            }
            ConflictCategory::Remediation => info!("{}", diagnostic.message),
        }
    }
}

fn check_vendors<T: TargetSystem>(
    system: &T,
    engine: &EngineConfig,
    catalog: &ServiceCatalog,
    disable_set: &DisableSet,
) -> Result<(), RunError> {
    let classifier = VendorClassifier::new(engine.path_resolver(), system, system)
        .with_expected_publisher(engine.expected_publisher.as_str());
    let review = VendorGate::new(&classifier).review(catalog, disable_set);

    if review.is_clear() {
        Ok(())
    } else {
        Err(RunError::VendorWarning(review))
    }
}

/// Dependencies of one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReport {
    /// Display name of the queried service
    pub service: String,

    /// Display names of its closure, sorted
    pub dependencies: Vec<String>,

    /// Indented tree of direct dependencies
    pub tree: DependencyTree,
}

impl DependencyReport {
    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        if self.dependencies.is_empty() {
            format!("{} has 0 dependencies", self.service)
        } else {
            format!("{} depends on {}", self.service, self.dependencies.join(", "))
        }
    }
}

/// Resolve the dependencies of one service
pub fn query_dependencies<S: ServiceStore>(
    store: &S,
    engine: &EngineConfig,
    service: &str,
    include_kernel_mode: bool,
) -> Result<DependencyReport, RunError> {
    let catalog = ServiceCatalog::load(store, &engine.type_table())?;
    let key = ServiceKey::new(service);

    let Some(record) = catalog.get(&key) else {
        return Err(RunError::UnknownService(service.to_string()));
    };

    let resolver = DependencyResolver::new(&catalog);
    let dependencies = resolver
        .closure(&key, include_kernel_mode)
        .iter()
        .map(|dep| catalog.display_name(dep).to_string())
        .collect();

    Ok(DependencyReport {
        service: record.name.clone(),
        dependencies,
        tree: resolver.dependency_tree(&key, include_kernel_mode),
    })
}
