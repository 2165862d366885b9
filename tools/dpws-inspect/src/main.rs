// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DPWS envelope inspector
//!
//! Command-line tool for looking at captured DPWS SOAP messages.
//!
//! # Usage
//!
//! ```bash
//! # Decode a captured envelope and print its header and body
//! dpws-inspect decode hello.xml
//!
//! # Decode as if it arrived from a given address on a 2006 transport
//! dpws-inspect decode probe.xml --source 192.168.1.20 --dpws-version dpws2006
//!
//! # Decode, re-encode and compare
//! dpws-inspect roundtrip probe-matches.xml
//!
//! # Generate / validate a codec configuration file
//! dpws-inspect gen-config --output dpws.toml
//! dpws-inspect validate --config dpws.toml
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dpws::codec::{AcceptAll, CodecEnvironment, CodecPool, ConnectionInfo};
use dpws::model::{Message, MessageBody};
use dpws::{CodecConfig, ProtocolVersion};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// DPWS SOAP envelope inspector
#[derive(Parser, Debug)]
#[command(name = "dpws-inspect")]
#[command(about = "Inspect, validate and round-trip DPWS SOAP envelopes")]
#[command(version)]
struct Args {
    /// Codec configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode an envelope and print it
    Decode {
        /// Envelope file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Transport source address to report
        #[arg(long, default_value = "127.0.0.1")]
        source: String,

        /// Version the transport is bound to (dpws2006, dpws2009)
        #[arg(long, value_parser = parse_version)]
        dpws_version: Option<ProtocolVersion>,

        /// Print the full typed body
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decode, re-encode and decode again, then compare
    Roundtrip {
        /// Envelope file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the re-encoded envelope
        #[arg(short, long)]
        print: bool,
    },

    /// Generate a configuration file with default values
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "dpws.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match args.command {
        Commands::Decode {
            input,
            source,
            dpws_version,
            verbose,
        } => {
            let config = load_config(args.config.as_deref())?;
            cmd_decode(config, &input, source, dpws_version, verbose)
        }
        Commands::Roundtrip { input, print } => {
            let config = load_config(args.config.as_deref())?;
            cmd_roundtrip(config, &input, print)
        }
        Commands::GenConfig { output } => cmd_gen_config(&output),
        Commands::Validate => {
            let Some(path) = args.config else {
                bail!("validate needs --config <FILE>");
            };
            cmd_validate(&path)
        }
    }
}

fn parse_version(value: &str) -> Result<ProtocolVersion, String> {
    match value.to_ascii_lowercase().as_str() {
        "dpws2006" | "2006" => Ok(ProtocolVersion::Dpws2006),
        "dpws2009" | "2009" | "1.1" => Ok(ProtocolVersion::Dpws2009),
        other => Err(format!("unknown DPWS version '{}'", other)),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CodecConfig> {
    match path {
        Some(path) => CodecConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(CodecConfig::default()),
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    tracing::debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Pool whose environment accepts everything: a capture is inspected, not filtered.
fn inspection_pool(config: CodecConfig) -> CodecPool {
    let env = CodecEnvironment::builder()
        .config(config)
        .discard_policy(Arc::new(AcceptAll))
        .build();
    CodecPool::with_environment(Arc::new(env))
}

fn cmd_decode(
    config: CodecConfig,
    input: &Path,
    source: String,
    version: Option<ProtocolVersion>,
    verbose: bool,
) -> anyhow::Result<()> {
    let bytes = read_input(input)?;
    let pool = inspection_pool(config);
    let mut connection = ConnectionInfo::inbound(source);
    connection.version = version;

    let message = pool
        .decode(&bytes, &connection)
        .with_context(|| format!("decoding {}", input.display()))?;
    print_message(&message, verbose);
    Ok(())
}

fn cmd_roundtrip(config: CodecConfig, input: &Path, print: bool) -> anyhow::Result<()> {
    let bytes = read_input(input)?;
    let pool = inspection_pool(config);
    let inbound = ConnectionInfo::inbound("127.0.0.1");

    let first = pool
        .decode(&bytes, &inbound)
        .with_context(|| format!("decoding {}", input.display()))?;
    let encoded = pool
        .encode(&first, &ConnectionInfo::outbound())
        .context("re-encoding decoded message")?;
    let second = pool
        .decode(&encoded, &inbound)
        .context("decoding re-encoded message")?;

    println!(
        "{}: {} bytes in, {} bytes out",
        first.kind(),
        bytes.len(),
        encoded.len()
    );
    if print {
        println!("{}", String::from_utf8_lossy(&encoded));
    }
    if first != second {
        eprintln!("first decode:  {:#?}", first);
        eprintln!("second decode: {:#?}", second);
        bail!("round trip changed the message");
    }
    println!("Round trip OK");
    Ok(())
}

fn cmd_gen_config(output: &Path) -> anyhow::Result<()> {
    let toml_str =
        toml::to_string_pretty(&CodecConfig::default()).context("serializing configuration")?;
    let content = format!(
        r#"# DPWS Codec Configuration
# Generated by dpws-inspect gen-config

{}"#,
        toml_str
    );
    std::fs::write(output, content).with_context(|| format!("writing {}", output.display()))?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(path: &Path) -> anyhow::Result<()> {
    match CodecConfig::from_file(path) {
        Ok(config) => {
            println!("Configuration valid!");
            println!();
            println!("Datagram size:        {} bytes", config.max_datagram_size);
            println!("Sequence ids:         {}", config.max_sequence_ids);
            println!("MessageID buffer:     {}", config.message_id_buffer_size);
            println!("Default version:      {}", config.default_version);
            println!(
                "Subscription id:      {}",
                if config.reference_parameter_mode {
                    "reference parameter"
                } else {
                    "NotifyTo fragment"
                }
            );
            println!("Track sent messages:  {}", config.track_sent_messages);
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_message(message: &Message, verbose: bool) {
    let header = &message.header;
    println!("Kind:        {}", message.kind());
    println!("Version:     {}", header.version);
    println!("Action:      {}", header.action);
    if let Some(id) = &header.message_id {
        println!("MessageID:   {}", id);
    }
    if let Some(id) = &header.relates_to {
        println!("RelatesTo:   {}", id);
    }
    if let Some(to) = &header.to {
        println!("To:          {}", to);
    }
    if let Some(seq) = &header.app_sequence {
        println!(
            "AppSequence: instance {} seq {} number {}",
            seq.instance_id,
            seq.sequence_id.as_deref().unwrap_or("-"),
            seq.message_number
        );
    }
    if !header.reference_parameters.is_empty() {
        println!("RefParams:   {}", header.reference_parameters.len());
    }
    if header.secure {
        println!("Signature:   valid");
    }

    match &message.body {
        MessageBody::Hello(hello) => print_endpoint(&hello.data),
        MessageBody::Bye(bye) => print_endpoint(&bye.data),
        MessageBody::ProbeMatches(matches) => {
            println!("Matches:     {}", matches.matches.len());
            for data in &matches.matches {
                print_endpoint(data);
            }
        }
        MessageBody::ResolveMatches(matches) => {
            if let Some(data) = &matches.resolve_match {
                print_endpoint(data);
            }
        }
        _ => {}
    }

    if verbose {
        println!();
        println!("{:#?}", message.body);
    }
}

fn print_endpoint(data: &dpws::model::DiscoveryData) {
    println!("  Endpoint:  {}", data.endpoint_reference.address);
    if let Some(types) = &data.types {
        let names: Vec<String> = types.iter().map(ToString::to_string).collect();
        println!("  Types:     {}", names.join(" "));
    }
    if let Some(xaddrs) = &data.xaddrs {
        println!("  XAddrs:    {}", xaddrs.join(" "));
    }
    if let Some(version) = data.metadata_version {
        println!("  Metadata:  v{}", version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_aliases() {
        assert_eq!(parse_version("2006").unwrap(), ProtocolVersion::Dpws2006);
        assert_eq!(parse_version("DPWS2009").unwrap(), ProtocolVersion::Dpws2009);
        assert!(parse_version("2030").is_err());
    }

    #[test]
    fn test_cli_parses_decode() {
        let args = Args::parse_from(["dpws-inspect", "decode", "hello.xml", "--verbose"]);
        assert!(matches!(args.command, Commands::Decode { verbose: true, .. }));
    }
}
