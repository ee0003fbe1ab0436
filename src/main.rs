use anyhow::Context;
use clap::Parser;
use gazette_matcher::client::{HttpMatchClient, UploadFile};
use gazette_matcher::controller::{AssumeYes, ClearOutcome, Confirm, Controller, DialoguerConfirm};
use gazette_matcher::{cli, config, export, logging, render};
use gazette_matcher_common::{ExportFormat, SubmissionParameters};
use cli::{Cli, Commands, ViewArgs};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load().context("failed to load config")?;
    if let Some(base) = &cli.api_base {
        config.api_base = base.clone();
    }

    match cli.command {
        Commands::Match { pdf, excel, mode, threshold, view, export: export_dir } => {
            println!("📑 gazette-matcher - match\n");

            let mode = mode.unwrap_or(config.default_mode);
            let threshold = threshold.unwrap_or(config.default_threshold);
            let params = SubmissionParameters::new(mode, threshold);

            let pdf = pdf.as_deref().map(UploadFile::from_path).transpose()?;
            let excel = excel.as_deref().map(UploadFile::from_path).transpose()?;

            let mut controller = controller(&config)?;
            if mode.uses_threshold() {
                println!("[1/2] Uploading ({}, threshold {})...", mode.label(), threshold);
            } else {
                println!("[1/2] Uploading ({})...", mode.label());
            }

            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}%")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            let result = controller
                .submit(pdf, excel, params, |percent| bar.set_position(percent as u64))
                .await;
            bar.finish_and_clear();

            if let Err(e) = result {
                anyhow::bail!(e.user_message());
            }
            println!("✔ Matching complete\n");
            println!("[2/2] Results");
            show(&mut controller, &view);

            if let Some(dir) = export_dir {
                write_export(controller.session(), ExportFormat::Csv, &dir)?;
            }
        }

        Commands::Records { view } => {
            let mut controller = controller(&config)?;
            controller.refresh().await.context("failed to fetch records")?;
            show(&mut controller, &view);
        }

        Commands::Export { search, format, output } => {
            println!("📄 gazette-matcher - export\n");

            let mut controller = controller(&config)?;
            println!("- Fetching stored records...");
            let count = controller.refresh().await.context("failed to fetch records")?;
            println!("✔ {} records", count);

            if let Some(search) = search {
                controller.session_mut().set_search(search);
            }
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            write_export(controller.session(), format, &output_dir)?;
        }

        Commands::Clear { yes } => {
            let mut controller = controller(&config)?;
            let confirm: &dyn Confirm = if yes { &AssumeYes } else { &DialoguerConfirm };

            match controller.clear(confirm).await {
                Ok(ClearOutcome::Cleared) => println!("✔ All stored matches cleared"),
                Ok(ClearOutcome::Declined) => println!("Cancelled"),
                Err(e) => anyhow::bail!(e.user_message()),
            }
        }

        Commands::Config { set_api_base, show } => {
            if let Some(base) = set_api_base {
                config.set_api_base(base)?;
                println!("✔ API base set to {}", config.api_base);
            }

            if show {
                println!("Config:");
                println!("  API base: {}", config.api_base);
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Progress grace: {}ms", config.progress_grace_ms);
                println!("  Default mode: {}", config.default_mode.label());
                println!("  Default threshold: {}", config.default_threshold);
                println!("  On failed clear: {:?}", config.clear_failure);
            }
        }
    }

    Ok(())
}

fn controller(config: &Config) -> anyhow::Result<Controller<HttpMatchClient>> {
    let client = HttpMatchClient::new(&config.api_base, config.timeout())?;
    Ok(Controller::new(client, config))
}

fn show(controller: &mut Controller<HttpMatchClient>, view: &ViewArgs) {
    view.apply(controller.session_mut());
    print!("{}", render::render_session(controller.session()));
}

fn write_export(
    session: &gazette_matcher_common::Session,
    format: ExportFormat,
    dir: &Path,
) -> anyhow::Result<()> {
    if !session.can_export() {
        println!("No records to export.");
        return Ok(());
    }
    println!("- Writing {}...", format);
    let now = chrono::Utc::now().timestamp_millis();
    let (path, artifact) = export::write_export(session, format, dir, now)?;
    println!("✔ {} rows exported: {}", artifact.rows, path.display());
    Ok(())
}
