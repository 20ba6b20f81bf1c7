use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;
use std::{env, process};
use structopt::StructOpt;

#[macro_use]
extern crate yaserde_derive;

mod client;
mod error;
mod model;
mod report;
mod request;

use client::QtestClient;
use error::UploadError;

const API_TOKEN_VAR: &str = "QTEST_API_TOKEN";

#[derive(StructOpt, Debug)]
#[structopt(about = "Parse JUnitXML results and hand them to qTest manager.")]
struct Opt {
    /// Silence all output
    #[structopt(short = "q", long)]
    quiet: bool,

    /// Verbose mode (-v, -vv, -vvv, -vvvv). The levels are warnings, informational, debugging, and trace message.
    #[structopt(short = "v", long, parse(from_occurrences))]
    verbose: usize,

    /// Timestamp (sec, ms, ns, none)
    #[structopt(short = "t", long = "timestamp")]
    ts: Option<stderrlog::Timestamp>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Upload JUnitXML results to qTest manager and print the returned queue job id.
    ///
    /// Requires the QTEST_API_TOKEN environment variable to be set to a qTest
    /// API token authorized for the target project.
    Upload {
        /// A valid JUnitXML results file
        #[structopt(parse(from_os_str))]
        junit_input_file: PathBuf,

        /// The target qTest project ID for results
        qtest_project_id: u64,

        /// The qTest cycle to use as a parent for results
        qtest_test_cycle: String,

        /// Base URL of the qTest instance
        #[structopt(long, default_value = "https://apitryout.qtestnet.com")]
        host: String,
    },

    /// Write the qTest automation request as JSON instead of submitting it.
    Json {
        /// A valid JUnitXML results file
        #[structopt(parse(from_os_str))]
        junit_input_file: PathBuf,

        /// Where to write the automation request JSON
        #[structopt(parse(from_os_str))]
        output_file: PathBuf,

        /// The qTest cycle to use as a parent for results
        qtest_test_cycle: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::from_args();

    stderrlog::new()
        .module(module_path!())
        .quiet(opt.quiet)
        .verbosity(opt.verbose)
        .timestamp(opt.ts.unwrap_or(stderrlog::Timestamp::Off))
        .init()?;

    if let Err(err) = run(opt.command).await {
        eprintln!("{err}");
        eprintln!("\nFailed!");
        process::exit(1);
    }

    Ok(())
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Upload {
            junit_input_file,
            qtest_project_id,
            qtest_test_cycle,
            host,
        } => {
            let token = api_token()?;
            let suite = report::load_report(&junit_input_file)?;
            debug!(
                "parsed {} testcases from {:?}",
                suite.testcases.len(),
                junit_input_file
            );

            let auto_request = request::assemble(&suite, &qtest_test_cycle);
            let job_id = QtestClient::new(&host, &token)
                .submit(qtest_project_id, &auto_request)
                .await?;
            info!("submitted {} test logs to project {qtest_project_id}", auto_request.test_logs.len());

            println!("\nQueue Job ID: {job_id}");
            println!("\nSuccess!");
        }
        Command::Json {
            junit_input_file,
            output_file,
            qtest_test_cycle,
        } => {
            let suite = report::load_report(&junit_input_file)?;
            debug!(
                "parsed {} testcases from {:?}",
                suite.testcases.len(),
                junit_input_file
            );

            let auto_request = request::assemble(&suite, &qtest_test_cycle);
            let json = request::serialize(&auto_request)?;
            request::write_to_path(&json, &output_file)?;
            info!("wrote automation request to {:?}", output_file);
        }
    }

    Ok(())
}

/// The qTest API token from the environment; unset or empty both count as
/// missing, matching how CI systems export blank secrets.
fn api_token() -> Result<String, UploadError> {
    match env::var(API_TOKEN_VAR) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(UploadError::MissingCredential(API_TOKEN_VAR)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn api_token_requires_a_non_empty_value() {
        env::remove_var(API_TOKEN_VAR);
        assert!(matches!(
            api_token(),
            Err(UploadError::MissingCredential(var)) if var == API_TOKEN_VAR
        ));

        env::set_var(API_TOKEN_VAR, "");
        assert!(api_token().is_err());

        env::set_var(API_TOKEN_VAR, "s3cr3t");
        assert_eq!(api_token().unwrap(), "s3cr3t");
        env::remove_var(API_TOKEN_VAR);
    }
}
