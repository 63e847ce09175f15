//! `rdx seed`: fill the address book with random sample data.

use crate::output::{CliError, OutputMode, fail, render, render_error};
use clap::Args;
use rolodex_core::seed::{self, DEFAULT_COUNT, SeedOptions};
use rolodex_core::{ErrorCode, Settings};

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Number of addresses to generate.
    #[arg(short = 'n', long, default_value_t = DEFAULT_COUNT)]
    pub count: usize,

    /// RNG seed for a reproducible data set.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Wipe a non-empty address book before seeding.
    #[arg(long)]
    pub force: bool,
}

/// Execute `rdx seed`.
///
/// # Errors
///
/// Returns an error if the address book is non-empty without `--force`, or
/// if any write fails.
pub fn run_seed(args: &SeedArgs, output: OutputMode, settings: &Settings) -> anyhow::Result<()> {
    let store = super::open_store(settings, output)?;

    let existing = store.count_addresses().map_err(|err| fail(output, err))?;
    if existing > 0 && !args.force {
        let msg = format!("address book already holds {existing} address(es)");
        render_error(
            output,
            &CliError::with_details(
                &msg,
                "re-run with --force to replace them",
                ErrorCode::ValidationFailed.code(),
            ),
        )?;
        anyhow::bail!(msg);
    }

    let options = SeedOptions {
        count: args.count,
        seed: args.seed,
        ..SeedOptions::default()
    };
    let report = seed::reset_and_seed(&store, &options).map_err(|err| fail(output, err))?;
    tracing::info!(
        addresses = report.addresses,
        labels = report.labels,
        associations = report.associations,
        path = %settings.database_path().display(),
        "seeded address book"
    );

    render(output, &report, |r, w| {
        writeln!(
            w,
            "Seeded {} addresses, {} labels, {} associations",
            r.addresses, r.labels, r.associations
        )
    })
}
