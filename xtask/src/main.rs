// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - build, lint and test automation for the affiliate budget workspace
//!
//! - `cargo xtask test` runs every test against in-memory `SQLite`
//! - `cargo xtask test-mariadb` runs the ignored ledger backend tests against
//!   a throwaway `MariaDB` container
//!
//! External databases are opt-in only; plain `cargo test` never needs one.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{io, process::Output, thread::sleep, time::Duration};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    if let Err(err) = args.run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test)
    CI,

    /// Build the workspace
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the workspace
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check for typos
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix formatting issues
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run ledger backend tests against `MariaDB`
    #[command(visible_alias = "tm")]
    TestMariadb,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestMariadb => test_mariadb(),
        }
    }
}

/// Run CI checks (lint, build, test)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    Ok(())
}

fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Lint formatting, typos, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    Ok(())
}

fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without warnings for every default workspace package
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTDOCFLAGS", "-D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

fn lint_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all", "--check"])
}

fn fix_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all"])
}

/// Check for typos using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Run unit tests, then doc tests
fn test() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])?;
    run_cargo(vec!["test", "--doc", "--all-features"])
}

fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// A disposable `MariaDB` container, removed when dropped.
struct MariadbContainer {
    name: &'static str,
    database: &'static str,
    user: &'static str,
    password: &'static str,
    port: u16,
}

impl MariadbContainer {
    /// Starts the container, replacing any leftover from an earlier run.
    fn start() -> Result<Self> {
        let container = Self {
            name: "affiliate-budget-test-mariadb",
            database: "affiliate_budget_test",
            user: "affiliate_budget",
            password: "test_password",
            port: 3307,
        };
        container.remove();

        tracing::info!("Starting MariaDB container: {}", container.name);
        cmd!(
            "docker",
            "run",
            "--name",
            container.name,
            "-e",
            format!("MARIADB_DATABASE={}", container.database),
            "-e",
            format!("MARIADB_USER={}", container.user),
            "-e",
            format!("MARIADB_PASSWORD={}", container.password),
            "-e",
            "MARIADB_ROOT_PASSWORD=root_password",
            "-p",
            format!("{}:3306", container.port),
            "-d",
            "mariadb:11"
        )
        .run_with_trace()
        .wrap_err("Failed to start MariaDB container")?;

        Ok(container)
    }

    /// Polls the server once per second until it answers or `attempts` run out.
    fn wait_until_ready(&self, attempts: u32) -> Result<()> {
        for attempt in 1..=attempts {
            sleep(Duration::from_secs(1));
            tracing::debug!("Connection attempt {attempt}/{attempts}");

            let probe = cmd!(
                "docker",
                "exec",
                self.name,
                "mariadb",
                "-u",
                self.user,
                format!("-p{}", self.password),
                "-e",
                "SELECT 1"
            )
            .stdout_null()
            .stderr_null()
            .run();

            if probe.is_ok() {
                tracing::info!("MariaDB is ready");
                return Ok(());
            }
        }

        Err(color_eyre::eyre::eyre!(
            "MariaDB did not become ready within {attempts} seconds"
        ))
    }

    fn database_url(&self) -> String {
        format!(
            "mysql://{}:{}@127.0.0.1:{}/{}",
            self.user, self.password, self.port, self.database
        )
    }

    fn remove(&self) {
        // Failures only mean there was nothing to remove.
        let _ = cmd!("docker", "rm", "--force", self.name)
            .stdout_null()
            .stderr_null()
            .run();
    }
}

impl Drop for MariadbContainer {
    fn drop(&mut self) {
        tracing::info!("Removing MariaDB container: {}", self.name);
        self.remove();
    }
}

/// Run the ignored ledger backend tests against a `MariaDB` 11 container
///
/// Requires Docker and a free port 3307. The container is removed afterwards,
/// whether or not the tests pass. Tests receive `DATABASE_URL` and
/// `AFFILIATE_BUDGET_TEST_BACKEND=mariadb`.
fn test_mariadb() -> Result<()> {
    cmd!("docker", "--version")
        .run_with_trace()
        .wrap_err("Docker is not available. Please install Docker.")?;

    let container = MariadbContainer::start()?;
    container.wait_until_ready(30)?;

    tracing::info!("Running MariaDB backend validation tests");
    cmd!(
        "cargo",
        "test",
        "--package",
        "affiliate-budget-persistence",
        "backend_validation_tests",
        "--",
        "--ignored",
        "--test-threads=1"
    )
    .env("DATABASE_URL", container.database_url())
    .env("AFFILIATE_BUDGET_TEST_BACKEND", "mariadb")
    .run_with_trace()
    .wrap_err("MariaDB backend validation tests failed")?;

    tracing::info!("MariaDB backend validation completed successfully");
    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
