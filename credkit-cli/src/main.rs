//! Command-line client for credential verification.
//!
//! Reads an opaque credential blob, asks the local trust authority to
//! validate and decode it, prints the selected verdict metadata and the
//! recovered payload, and exits with the decode status code (0 on
//! success, the classified failure code otherwise). Fatal pipeline
//! errors print one diagnostic on stderr and exit with the generic
//! internal failure code.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use credkit_core::{
    Attribute, AttributeMask, Destination, FailureKind, RunConfig, RunConfigBuilder,
    SocketAuthority,
};

/// Validate and decode a credential via the local trust authority.
///
/// By default the credential is read from standard input and both the
/// verdict metadata and the recovered payload are written to standard
/// output.
#[derive(Parser)]
#[command(name = "credkit", version, about)]
struct Cli {
    /// Read the credential from FILE ('-' for standard input).
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    input: String,

    /// Write verdict metadata to FILE ('-' for standard output).
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    metadata: String,

    /// Write the recovered payload to FILE ('-' for standard output).
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    output: String,

    /// Discard all output.
    #[arg(short = 'n', long)]
    no_output: bool,

    /// Select a subset of metadata attributes to output. Names are
    /// separated by spaces, tabs, newlines, '.', ',' or ';', matched
    /// case-insensitively; unrecognized names are ignored.
    #[arg(short = 't', long, value_name = "LIST")]
    attributes: Vec<String>,

    /// Print the known metadata attribute names and exit.
    #[arg(short = 'T', long)]
    list_attributes: bool,

    /// Unix-domain socket endpoint of the trust authority.
    #[arg(short = 'S', long, value_name = "PATH", env = "CREDKIT_SOCKET")]
    socket: Option<PathBuf>,

    /// Enable verbose logging (repeat for more detail: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let mut builder = RunConfigBuilder::new()
            .input(Destination::parse(&self.input))
            .metadata(Destination::parse(&self.metadata))
            .payload(Destination::parse(&self.output));
        if !self.attributes.is_empty() {
            let list = self.attributes.join(" ");
            builder = builder.attributes(AttributeMask::parse_selection(&list));
        }
        if self.no_output {
            builder = builder.discard_output();
        }
        builder.build()
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list_attributes {
        for attribute in Attribute::all() {
            println!("{}", attribute.name());
        }
        return ExitCode::SUCCESS;
    }

    let authority = cli
        .socket
        .as_ref()
        .map_or_else(SocketAuthority::new, SocketAuthority::with_endpoint);
    let config = cli.into_config();

    match credkit_core::run(&config, &authority) {
        Ok(status) => {
            // The exit status is the decode status code.
            u8::try_from(status.code())
                .map_or(ExitCode::from(FailureKind::Internal.code()), ExitCode::from)
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::from(FailureKind::Internal.code())
        }
    }
}
