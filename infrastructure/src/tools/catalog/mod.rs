//! The tool catalog: one [`DomainOrchestrator`] per domain, wired to the
//! external tools it knows how to drive.

pub mod debloat;
pub mod drivers;
pub mod file_ops;
pub mod packages;
pub mod system_tools;

use actiongate_application::ProcessRunner;
use actiongate_domain::DomainOrchestrator;
use std::sync::Arc;

/// Every domain's orchestrator, in registry order.
pub fn orchestrators(runner: Arc<dyn ProcessRunner>) -> Vec<DomainOrchestrator> {
    vec![
        packages::orchestrator(runner.clone()),
        drivers::orchestrator(runner.clone()),
        debloat::orchestrator(runner.clone()),
        file_ops::orchestrator(runner.clone()),
        system_tools::orchestrator(runner),
    ]
}
