//! Migration orchestrator - sequences the phases of a run
//!
//! ```text
//! INIT -> (CLEANUP?) -> USERS -> GROUPS -> SUBSCRIPTIONS -> DONE
//! ```
//!
//! Each phase starts only after the previous one fully settled. The first
//! error ends the run; there are no backward transitions.

use std::time::Instant;
use tracing::{error, info, instrument};

use crate::migration::progress::ProgressReporter;
use crate::migration::steps::{
    cleanup_destination_users, migrate_group_memberships, migrate_subscriptions, migrate_users,
    StepContext,
};
use crate::migration::types::{MigrationReport, Phase, PhaseReport};
use crate::services::client::auth::select_credential;
use crate::services::client::{ApimApi, ArmClient, DryRunApim, TokenCredential};
use crate::services::config::MigratorConfig;
use crate::services::errors::{MigrationError, MigrationResult};

/// Switches that are not part of the environment configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Read and filter everything, write nothing
    pub dry_run: bool,
}

/// Drives one migration run against an already authenticated API
pub struct Migrator<'a, A: ApimApi + ?Sized> {
    api: &'a A,
    config: &'a MigratorConfig,
    reporter: &'a dyn ProgressReporter,
    dry_run: bool,
}

impl<'a, A: ApimApi + ?Sized> Migrator<'a, A> {
    pub fn new(api: &'a A, config: &'a MigratorConfig, reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            api,
            config,
            reporter,
            dry_run: false,
        }
    }

    /// Mark the report as a dry run; the caller supplies the non-writing API
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn execute(&self) -> MigrationResult<MigrationReport> {
        let started = Instant::now();

        match self.run_phases().await {
            Ok(phases) => {
                let report = MigrationReport {
                    phases,
                    elapsed: started.elapsed(),
                    dry_run: self.dry_run,
                };
                self.reporter.report_phase(Phase::Done);
                self.reporter.report_completion(&report);
                Ok(report)
            }
            Err(e) => {
                self.reporter.report_error(&e);
                Err(e)
            }
        }
    }

    async fn run_phases(&self) -> MigrationResult<Vec<PhaseReport>> {
        let ctx = StepContext::new(self.api, self.config);
        let mut phases = Vec::with_capacity(4);

        if self.config.cleanup_enabled {
            self.reporter.report_phase(Phase::Cleanup);
            let report = cleanup_destination_users(&ctx).await?;
            self.reporter.report_phase_complete(&report);
            phases.push(report);
        } else {
            info!("Cleanup disabled; destination users are kept");
        }

        self.reporter.report_phase(Phase::Users);
        let (lookup, report) = migrate_users(&ctx).await?;
        self.reporter.report_phase_complete(&report);
        phases.push(report);

        self.reporter.report_phase(Phase::Groups);
        let report = migrate_group_memberships(&ctx, &lookup).await?;
        self.reporter.report_phase_complete(&report);
        phases.push(report);

        self.reporter.report_phase(Phase::Subscriptions);
        let report = migrate_subscriptions(&ctx, &lookup).await?;
        self.reporter.report_phase_complete(&report);
        phases.push(report);

        Ok(phases)
    }
}

/// Validate the configuration, authenticate, and run every phase
#[instrument(skip_all, fields(
    source = %config.source.service_name,
    destination = %config.destination.service_name,
    dry_run = options.dry_run
))]
pub async fn run_migration(
    config: &MigratorConfig,
    options: RunOptions,
    reporter: &dyn ProgressReporter,
) -> MigrationResult<MigrationReport> {
    config.validate()?;

    reporter.report_phase(Phase::Init);
    let http_client = ArmClient::build_http_client(&config.network)
        .map_err(|source| MigrationError::Authentication { source })?;
    let credential = select_credential(
        http_client.clone(),
        config.access_token.clone(),
        &config.network.login_endpoint,
        &config.tenant_domain,
    );

    // Token is acquired before the first phase starts
    if let Err(source) = credential.access_token().await {
        let e = MigrationError::Authentication { source };
        error!("Could not obtain a management token: {}", e);
        reporter.report_error(&e);
        return Err(e);
    }
    info!("Authenticated against {}", config.network.management_endpoint);

    let client = ArmClient::new(http_client, credential, &config.subscription_id, &config.network);

    if options.dry_run {
        info!("Dry run: nothing will be written to {}", config.destination.service_name);
        let api = DryRunApim::new(&client, &config.subscription_id);
        Migrator::new(&api, config, reporter).dry_run(true).execute().await
    } else {
        Migrator::new(&client, config, reporter).execute().await
    }
}
