use asyncdns::dns::Answer;
use asyncdns::{output, sig};
use asyncdns_client::dns::{Interface, Name, QueryType, RecordData};
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level};

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_RECORD_TYPE: QueryType = QueryType::A;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// dnsq: Query DNS records through the system resolver or decode raw record data
#[derive(Debug, Parser)]
#[command(name = "dnsq", version = clap::crate_version!())]
struct DnsqConfig {
    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case-insensitive).
    #[arg(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    #[command(subcommand)]
    mode: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    Query(QueryCommand),
    Decode(DecodeCommand),
}

/// Perform a DNS query and display the results as dig-like text output.
#[derive(Debug, Args)]
struct QueryCommand {
    /// Maximum time to wait for the query to complete, in seconds.
    #[arg(long, env = "DNSQ_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Interface to scope PTR and SRV queries to. Supported: default, local-only.
    #[arg(long, default_value_t = Interface::Default)]
    interface: Interface,

    /// Type of record to request. Supported: A, AAAA, CNAME, MX, NAPTR, NS, PTR, SOA, SRV, TXT.
    #[arg(long, default_value_t = DEFAULT_RECORD_TYPE)]
    rtype: QueryType,

    /// Domain name to lookup.
    #[arg(required = true)]
    name: Name,
}

/// Read the rdata of a single record from standard input and display it decoded.
#[derive(Debug, Args)]
struct DecodeCommand {
    /// Type of record the rdata belongs to.
    #[arg(long, default_value_t = DEFAULT_RECORD_TYPE)]
    rtype: QueryType,

    /// TTL to associate with the decoded record.
    #[arg(long, default_value_t = 0)]
    ttl: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    let opts = DnsqConfig::parse();

    let console_subscriber =
        asyncdns::tracing::console_subscriber(opts.log_level).expect("failed to setup console logging");
    tracing::subscriber::set_global_default(console_subscriber).expect("failed to initialize console logging");

    match &opts.mode {
        Action::Query(cmd) => run_query(cmd).await,
        Action::Decode(cmd) => run_decode(cmd).await,
    }
}

async fn run_query(cmd: &QueryCommand) -> ExitCode {
    let token = CancellationToken::new();
    sig::wait_for_interrupt(Handle::current(), token.clone()).await;

    let resolver = asyncdns::dns::new_resolver(Duration::from_secs(cmd.timeout_secs), token.clone());
    let name = cmd.name.to_string();

    let answer = match asyncdns::dns::lookup(&resolver, cmd.rtype, &name, cmd.interface)
        .instrument(tracing::span!(Level::INFO, "dns.lookup"))
        .await
    {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(message = "unable to perform DNS query", name = %name, rtype = %cmd.rtype, err = %e);
            return ExitCode::FAILURE;
        }
    };

    // Stop waiting for an interrupt now that the query is done
    token.cancel();
    write_answer(&name, &answer).await
}

async fn run_decode(cmd: &DecodeCommand) -> ExitCode {
    let mut buf = Vec::new();
    let mut input = tokio::io::stdin();

    let n = match input.read_to_end(&mut buf).await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(message = "unable to read rdata from stdin", err = %e);
            return ExitCode::FAILURE;
        }
    };

    let rd = match RecordData::read_network_bytes(cmd.rtype, &buf[0..n], Some(cmd.ttl)) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::error!(message = "malformed rdata", rtype = %cmd.rtype, err = %e);
            return ExitCode::FAILURE;
        }
    };

    let mut out = String::new();
    output::format_record_data(&mut out, &rd);
    write_text(&out).await
}

async fn write_answer(name: &str, answer: &Answer) -> ExitCode {
    let mut buf = String::new();
    output::format_answer(&mut buf, name, answer);
    write_text(&buf).await
}

async fn write_text(buf: &str) -> ExitCode {
    let mut out = tokio::io::stdout();
    if let Err(e) = out.write_all(buf.as_bytes()).await {
        tracing::error!(message = "unable to write results to stdout", err = %e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = out.flush().await {
        tracing::error!(message = "unable to flush results to stdout", err = %e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
