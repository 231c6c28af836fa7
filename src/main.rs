/*!
 * Command-line interface for prompt-perfect
 */

use std::io;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use indicatif::{ProgressBar, ProgressStyle};

use prompt_perfect::assembler::{AutoConfirm, Confirm, FileDocuments, PromptAssembler, StdinConfirm};
use prompt_perfect::clipboard;
use prompt_perfect::config::{settings_command, Args, Config};
use prompt_perfect::error::PromptError;
use prompt_perfect::report::{PromptReport, ReportFormat, Reporter};
use prompt_perfect::settings::SettingsStore;
use prompt_perfect::utils::format_file_size;
use prompt_perfect::writer::OutputWriter;

/// Keeps the spinner out of the way while a question is on screen
struct SpinnerConfirm<'a> {
    progress: &'a ProgressBar,
    inner: &'a dyn Confirm,
}

impl Confirm for SpinnerConfirm<'_> {
    fn confirm(&self, message: &str) -> bool {
        self.progress.suspend(|| self.inner.confirm(message))
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut command = Args::command();
        let bin_name = command.get_name().to_string();
        generate(shell, &mut command, bin_name, &mut io::stdout());
        return Ok(());
    }

    setup_logging(args.quiet, args.verbose);

    let store = match &args.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::open_default()?,
    };

    // A broken settings file must not block resetting it
    let stored = match store.load() {
        Ok(settings) => settings,
        Err(e) if args.reset_settings => {
            log::warn!("{}", e);
            Default::default()
        }
        Err(e) => return Err(e.into()),
    };

    let mut config = Config::from_args(args.clone(), stored);

    if let Some(command) = settings_command(&args, &config.settings) {
        let settings = store.dispatch(command)?;
        let json = serde_json::to_string_pretty(&settings).map_err(PromptError::from)?;
        println!("{}", json);
        log::info!("Settings file: {}", store.path().display());
        return Ok(());
    }

    // Validate configuration
    config.validate()?;
    config.canonicalize()?;

    let progress = spinner(args.quiet);
    progress.set_prefix("🌳 Setup");
    progress.set_message(format!("📂 Project root: {}", config.root.display()));

    let matcher = config.ignore_matcher()?;

    let fixed;
    let interactive = StdinConfirm;
    let answer: &dyn Confirm = if config.assume_yes {
        fixed = AutoConfirm(true);
        &fixed
    } else {
        &interactive
    };
    let confirm = SpinnerConfirm {
        progress: &progress,
        inner: answer,
    };

    let start_time = Instant::now();

    progress.set_prefix("📊 Assembling");
    progress.set_message(format!("Reading {} documents", config.documents.len()));

    let assembler = PromptAssembler::new(&matcher, &config.settings, &confirm)
        .with_tree(config.include_tree)
        .with_documents_only_tree(config.tree_documents_only);
    let prompt = match assembler.assemble_from(&FileDocuments::new(config.documents.clone())) {
        Ok(prompt) => prompt,
        Err(e) => {
            progress.finish_and_clear();
            return Err(e.into());
        }
    };

    progress.finish_and_clear();

    let writer = OutputWriter::new(config.destination.clone());
    writer.write(&prompt.text)?;
    log::info!(
        "Wrote {} to {}",
        format_file_size(prompt.text.len() as u64),
        writer.destination()
    );

    let mut copied = false;
    if config.settings.auto_copy_to_clipboard {
        match clipboard::copy_to_clipboard(&prompt.text) {
            Ok(()) => {
                log::info!("Prompt copied to clipboard!");
                copied = true;
            }
            Err(e) => log::warn!("Failed to copy prompt to clipboard: {}", e),
        }
    }

    let total_duration = start_time.elapsed();

    if !args.quiet {
        let mut report =
            PromptReport::new(&prompt, writer.destination().to_string(), total_duration);
        report.copied_to_clipboard = copied;
        if config.settings.limit_prompt_length {
            report.token_limit = Some(config.settings.max_tokens);
        }

        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        reporter.print_report(&report);
    }

    Ok(())
}
