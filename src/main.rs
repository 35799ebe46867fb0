#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # labsend
//!
//! Emails lab grading reports to students.
//!
//! Export each module sheet of the grading workbook as
//! `<grading-dir>/<Module>.csv` and the roster as `roster.csv`, then:
//!
//! ```text
//! labsend modules
//! labsend preview Module-1
//! labsend test Module-1 "Jane" me@example.com --save-html jane.html
//! labsend send Module-1
//! ```

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use labsend::{
    config::Settings,
    credentials::{
        Credential, CredentialProvider, EnvCredentialProvider, FileCredentialStore, Provider,
        resolve,
    },
    grade::{BatchResult, GradingRecord, classify, render, run_module},
    mail::{Mailer, SmtpMailer, deliver_all},
    report,
    sheet::{list_modules, load_grading_sheet, load_roster, module_path},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Flags that override settings read from the environment.
#[derive(Debug, Clone)]
struct Overrides {
    /// Directory with the module sheets.
    grading_dir:   Option<PathBuf>,
    /// Roster CSV.
    roster:        Option<PathBuf>,
    /// Passing threshold.
    threshold:     Option<f64>,
    /// Preview excerpt length.
    preview_len:   Option<usize>,
    /// Rows above the header row.
    preamble_rows: Option<usize>,
}

impl Overrides {
    /// Applies every flag that was given.
    fn apply(self, settings: &mut Settings) {
        if let Some(dir) = self.grading_dir {
            settings.set_grading_dir(dir);
        }
        if let Some(roster) = self.roster {
            settings.set_roster_path(roster);
        }
        if let Some(threshold) = self.threshold {
            settings.set_passing_threshold(threshold);
        }
        if let Some(len) = self.preview_len {
            settings.set_preview_length(len);
        }
        if let Some(rows) = self.preamble_rows {
            settings.set_preamble_rows(rows);
        }
    }
}

/// Credential subcommands.
#[derive(Debug, Clone)]
enum CredentialsCmd {
    /// Store a sender for `provider` and `address`
    Configure(String, String),
    /// Print the sender in use
    Show,
    /// Remove the stored sender
    Clear,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// List module sheets
    Modules,
    /// Show what would be sent
    Preview {
        /// Print JSON instead of tables.
        json:   bool,
        /// Module sheet name.
        module: String,
    },
    /// Send every ready report for a module
    Send {
        /// Skip the confirmation prompt.
        yes:    bool,
        /// Module sheet name.
        module: String,
    },
    /// Send one student's report to another address
    Test {
        /// Also write the HTML body here.
        save_html: Option<PathBuf>,
        /// Skip the confirmation prompt.
        yes:       bool,
        /// Module sheet name.
        module:    String,
        /// Part of the student's name.
        student:   String,
        /// Address that receives the test email.
        to:        String,
    },
    /// Manage sender credentials
    Credentials(CredentialsCmd),
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Opts {
    /// Settings overrides.
    overrides: Overrides,
    /// Command to run.
    cmd:       Cmd,
}

/// Parse the command line arguments
fn options() -> Opts {
    /// parses a module sheet name
    fn m() -> impl Parser<String> {
        positional("MODULE").help("Module sheet name, e.g. Module-1")
    }

    /// parses the confirmation bypass
    fn y() -> impl Parser<bool> {
        long("yes")
            .short('y')
            .help("Send without asking for confirmation")
            .switch()
    }

    let grading_dir = long("grading-dir")
        .help("Directory with one CSV per module sheet")
        .argument::<PathBuf>("DIR")
        .optional();
    let roster = long("roster")
        .help("Roster CSV with Full Name and Email columns")
        .argument::<PathBuf>("FILE")
        .optional();
    let threshold = long("threshold")
        .help("Passing threshold as a fraction, e.g. 0.8")
        .argument::<f64>("FRACTION")
        .optional();
    let preview_len = long("preview-len")
        .help("Characters of each report shown in the preview")
        .argument::<usize>("CHARS")
        .optional();
    let preamble_rows = long("preamble-rows")
        .help("Rows above the header row in each module sheet")
        .argument::<usize>("ROWS")
        .optional();
    let overrides = construct!(Overrides {
        grading_dir,
        roster,
        threshold,
        preview_len,
        preamble_rows
    });

    let modules = pure(Cmd::Modules)
        .to_options()
        .command("modules")
        .help("List the module sheets in the grading directory");

    let json = long("json").help("Print the batch as JSON").switch();
    let module = m();
    let preview = construct!(Cmd::Preview { json, module })
        .to_options()
        .command("preview")
        .help("Preview the reports for a module without sending");

    let yes = y();
    let module = m();
    let send = construct!(Cmd::Send { yes, module })
        .to_options()
        .command("send")
        .help("Send the reports for a module");

    let save_html = long("save-html")
        .help("Write the rendered HTML to this file")
        .argument::<PathBuf>("FILE")
        .optional();
    let yes = y();
    let module = m();
    let student = positional("STUDENT").help("Part of the student's name");
    let to = positional("TO").help("Address that receives the test email");
    let test = construct!(Cmd::Test {
        save_html,
        yes,
        module,
        student,
        to
    })
    .to_options()
    .command("test")
    .help("Send one report to a test address");

    let provider = positional("PROVIDER").help("gmail, outlook, or host[:port]");
    let address = positional("ADDRESS").help("Sender address");
    let configure = construct!(CredentialsCmd::Configure(provider, address))
        .to_options()
        .command("configure")
        .help("Store sender credentials; the password is read from LABSEND_SMTP_PASSWORD or stdin");
    let show = pure(CredentialsCmd::Show)
        .to_options()
        .command("show")
        .help("Show the sender in use");
    let clear = pure(CredentialsCmd::Clear)
        .to_options()
        .command("clear")
        .help("Delete the stored credential file");
    let credentials = construct!([configure, show, clear])
        .to_options()
        .command("credentials")
        .help("Manage sender credentials")
        .map(Cmd::Credentials);

    let cmd = construct!([modules, preview, send, test, credentials]);

    construct!(Opts { overrides, cmd })
        .to_options()
        .descr("Email lab grading reports to students")
        .run()
}

/// Prints `question` and reads one line from stdin.
fn prompt(question: &str) -> Result<String> {
    eprint!("{question}");
    std::io::stderr().flush().context("Could not write to stderr")?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Could not read from stdin")?;
    Ok(line.trim().to_string())
}

/// Asks the operator to type `yes`.
fn confirm(question: &str) -> Result<bool> {
    Ok(prompt(&format!("{question} Type 'yes' to continue: "))?.eq_ignore_ascii_case("yes"))
}

/// Loads a module sheet and the roster, then classifies, matches, and renders
/// every row.
fn load_batch(settings: &Settings, module: &str) -> Result<BatchResult> {
    let sheet = module_path(settings.grading_dir(), module);
    let records = load_grading_sheet(&sheet, module, settings.preamble_rows())
        .with_context(|| format!("Failed to load module `{module}`"))?;
    let roster = load_roster(settings.roster_path()).context("Failed to load the roster")?;
    run_module(&records, &roster, settings.passing_threshold())
        .with_context(|| format!("Failed to process module `{module}`"))
}

/// Prints the preview table and the skip summary.
fn print_preview(settings: &Settings, module: &str, batch: &BatchResult) {
    if batch.sendable.is_empty() {
        eprintln!("{}", format!("No reports ready to send for {module}.").yellow());
    } else {
        println!(
            "{}",
            report::preview_table(module, batch, settings.preview_length())
        );
    }
    let skipped = report::skip_summary(batch);
    if !skipped.is_empty() {
        eprintln!("{}", skipped.yellow());
    }
}

/// Secret from `LABSEND_SMTP_PASSWORD`, or typed by the operator.
fn read_secret() -> Result<String> {
    if let Ok(secret) = std::env::var("LABSEND_SMTP_PASSWORD")
        && !secret.trim().is_empty()
    {
        return Ok(secret.trim().to_string());
    }
    let secret = prompt("Password (use an app password where supported): ")?;
    if secret.is_empty() {
        bail!("No password given");
    }
    Ok(secret)
}

/// Resolves the sender from the environment, then the credential file. When
/// neither has one, asks for it and saves it to the file.
fn sender(store: &FileCredentialStore) -> Result<Credential> {
    let providers: [&dyn CredentialProvider; 2] = [&EnvCredentialProvider, store];
    if let Some(credential) = resolve(&providers).context("Failed to read sender credentials")? {
        return Ok(credential);
    }

    eprintln!("No sender configured yet.");
    let provider: Provider = prompt("Provider (gmail, outlook, or host[:port]): ")?
        .parse()
        .context("Invalid provider")?;
    let address = prompt("Sender address: ")?;
    let credential = Credential::new(provider, address, read_secret()?);
    store
        .save(&credential)
        .context("Failed to save sender credentials")?;
    Ok(credential)
}

/// Opens the SMTP session for the resolved sender.
fn connect(settings: &Settings, store: &FileCredentialStore) -> Result<SmtpMailer> {
    let credential = sender(store)?;
    SmtpMailer::connect(&credential, settings.smtp_timeout())
        .with_context(|| format!("Failed to connect to {}", credential.provider))
}

/// First complete record whose name contains `student`, ignoring case.
fn find_student<'r>(
    records: &'r [GradingRecord],
    student: &str,
    threshold: f64,
) -> Option<&'r GradingRecord> {
    let needle = student.to_lowercase();
    records
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .find(|r| classify(r, threshold).is_complete())
}

fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let Opts { overrides, cmd } = options();
    let mut settings = Settings::from_env();
    overrides.apply(&mut settings);
    let store = FileCredentialStore::new(settings.credentials_path());

    match cmd {
        Cmd::Modules => {
            let modules = list_modules(settings.grading_dir()).with_context(|| {
                format!("Failed to list {}", settings.grading_dir().display())
            })?;
            if modules.is_empty() {
                eprintln!(
                    "No module sheets found in {}",
                    settings.grading_dir().display()
                );
            }
            for module in modules {
                println!("{module}");
            }
        }
        Cmd::Preview { json, module } => {
            let batch = load_batch(&settings, &module)?;
            if json {
                let out = serde_json::to_string_pretty(&batch)
                    .context("Failed to serialize the batch")?;
                println!("{out}");
            } else {
                print_preview(&settings, &module, &batch);
            }
        }
        Cmd::Send { yes, module } => {
            let batch = load_batch(&settings, &module)?;
            print_preview(&settings, &module, &batch);
            if batch.sendable.is_empty() {
                return Ok(());
            }

            let question = format!("Send {} email(s) for {module}?", batch.sendable.len());
            if !yes && !confirm(&question)? {
                eprintln!("{}", "Cancelled. Nothing was sent.".yellow());
                return Ok(());
            }

            let mailer = connect(&settings, &store)?;
            let delivery = deliver_all(&mailer, batch.emails());
            if let Some(table) = report::failure_table(&delivery) {
                eprintln!("{table}");
            }
            let line = report::delivery_line(&delivery);
            if delivery.failed.is_empty() {
                println!("{}", line.green());
            } else {
                println!("{}", line.red());
            }
        }
        Cmd::Test {
            save_html,
            yes,
            module,
            student,
            to,
        } => {
            let sheet = module_path(settings.grading_dir(), &module);
            let records = load_grading_sheet(&sheet, &module, settings.preamble_rows())
                .with_context(|| format!("Failed to load module `{module}`"))?;
            let Some(record) = find_student(&records, &student, settings.passing_threshold())
            else {
                bail!("No complete record in {module} matches `{student}`");
            };

            let classification = classify(record, settings.passing_threshold());
            let email = render(record, &classification, Some(to.as_str()))
                .with_context(|| format!("Failed to render the report for {}", record.name))?
                .as_test(to.as_str());

            println!("{} {}", "To:".bold(), email.recipient);
            println!("{} {}", "Subject:".bold(), email.subject);
            println!("{}", email.excerpt(settings.preview_length()));

            if let Some(path) = save_html {
                std::fs::write(&path, &email.html)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("HTML saved to {}", path.display());
            }

            if !yes && !confirm(&format!("Send the test email to {to}?"))? {
                eprintln!("{}", "Cancelled. Nothing was sent.".yellow());
                return Ok(());
            }

            let mailer = connect(&settings, &store)?;
            mailer
                .send(&email)
                .with_context(|| format!("Failed to send the test email to {to}"))?;
            println!("{}", format!("Test email sent to {to}").green());
        }
        Cmd::Credentials(credentials_cmd) => match credentials_cmd {
            CredentialsCmd::Configure(provider, address) => {
                let provider: Provider = provider.parse().context("Invalid provider")?;
                let credential = Credential::new(provider, address, read_secret()?);
                store
                    .save(&credential)
                    .context("Failed to save sender credentials")?;
            }
            CredentialsCmd::Show => {
                let providers: [&dyn CredentialProvider; 2] = [&EnvCredentialProvider, &store];
                match resolve(&providers).context("Failed to read sender credentials")? {
                    Some(credential) => {
                        println!("{} {}", "Server:".bold(), credential.provider);
                        println!("{} {}", "Sender:".bold(), credential.address);
                    }
                    None => eprintln!("No sender configured."),
                }
            }
            CredentialsCmd::Clear => {
                if store.clear().context("Failed to clear sender credentials")? {
                    println!("Removed {}", store.path().display());
                } else {
                    eprintln!("Nothing stored at {}", store.path().display());
                }
            }
        },
    };

    Ok(())
}
