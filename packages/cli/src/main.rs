//! `webfinger`: WebFinger lookup and XRD/JRD conversion on the command line.
//!
//! Provides three subcommands:
//!
//! - **`lookup`**: resolve a resource URI and print its WebFinger document.
//! - **`host-meta`**: print a host's host-meta document.
//! - **`convert`**: turn an XRD document into JRD or the other way round.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `xrd_discovery=info`).

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use xrd::Descriptor;
use xrd_discovery::{DiscoveryClient, DiscoveryConfig};

/// webfinger: WebFinger (RFC 7033) and host-meta (RFC 6415) client
#[derive(Parser)]
#[command(name = "webfinger", version, about, long_about = None)]
struct Cli {
    /// Per-request HTTP timeout in seconds.
    #[arg(long, global = true, value_name = "SECS", env = "XRD_HTTP_TIMEOUT_SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a resource and print its WebFinger document.
    ///
    /// Examples:
    ///   webfinger lookup acct:mirai_iro@mstdn.jp
    ///   webfinger lookup https://mstdn.jp/@mirai_iro --format json
    Lookup {
        /// Resource URI, e.g. `acct:user@host`.
        resource: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Xml)]
        format: Format,
    },

    /// Print the host-meta document of a host.
    ///
    /// Exits 1 if the host publishes none over HTTPS or HTTP.
    HostMeta {
        /// Host name, optionally with `:port`.
        host: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Xml)]
        format: Format,
    },

    /// Convert an XRD document to JRD, or a JRD document to XRD.
    ///
    /// The input format is detected from its first non-blank character.
    /// Pass `-` as FILE to read from stdin.
    Convert {
        /// Path to an XRD or JRD file, or `-` for stdin.
        file: PathBuf,

        /// Output format; defaults to the opposite of the input.
        #[arg(short, long, value_enum)]
        to: Option<Format>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Xml,
    Json,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xrd_discovery=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Lookup { resource, format } => {
            let client = build_client(cli.timeout);
            match client.get(&resource).await {
                Ok(webfinger) => print!("{}", render(&webfinger, format)),
                Err(e) => {
                    eprintln!("webfinger: lookup of {resource} failed: {e}");
                    process::exit(1);
                }
            }
        }

        Command::HostMeta { host, format } => {
            let client = build_client(cli.timeout);
            match client.get_host_meta(&host).await {
                Ok(Some(host_meta)) => print!("{}", render(&host_meta, format)),
                Ok(None) => {
                    eprintln!("webfinger: {host} has no host-meta document");
                    process::exit(1);
                }
                Err(e) => fatal(&e.to_string()),
            }
        }

        Command::Convert { file, to } => {
            let text = read_input(&file);
            let (descriptor, from) = parse_descriptor(&text);
            let to = to.unwrap_or(match from {
                Format::Xml => Format::Json,
                Format::Json => Format::Xml,
            });
            print!("{}", render(&descriptor, to));
        }
    }
}

fn build_client(timeout: Option<u64>) -> DiscoveryClient {
    let mut config = DiscoveryConfig::from_env();
    if let Some(secs) = timeout {
        config.timeout_secs = secs;
    }
    DiscoveryClient::from_config(&config).unwrap_or_else(|e| fatal(&e.to_string()))
}

/// XML one element per line; JSON pretty-printed. Both end with a newline.
fn render(descriptor: &Descriptor, format: Format) -> String {
    match format {
        Format::Xml => descriptor.to_xml().replace("><", ">\n<"),
        Format::Json => {
            let value: serde_json::Value = serde_json::from_str(&descriptor.to_json())
                .unwrap_or_else(|e| fatal(&format!("failed to re-read JRD output: {e}")));
            let mut out = serde_json::to_string_pretty(&value)
                .unwrap_or_else(|e| fatal(&format!("failed to format JRD output: {e}")));
            out.push('\n');
            out
        }
    }
}

/// Parse `text` as XRD if it starts with `<`, as JRD if it starts with `{`.
fn parse_descriptor(text: &str) -> (Descriptor, Format) {
    let format = match text.trim_start().chars().next() {
        Some('<') => Format::Xml,
        Some('{') => Format::Json,
        _ => fatal("input is neither an XRD (XML) nor a JRD (JSON) document"),
    };
    let parsed = match format {
        Format::Xml => Descriptor::from_xml(text),
        Format::Json => Descriptor::from_json(text),
    };
    match parsed {
        Ok(descriptor) => (descriptor, format),
        Err(e) => fatal(&format!("failed to parse input: {e}")),
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
        buf
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {e}", path.display())))
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("webfinger: {msg}");
    process::exit(2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_input_format() {
        let (xml, format) =
            parse_descriptor("  <XRD xmlns=\"http://docs.oasis-open.org/ns/xri/xrd-1.0\"/>");
        assert!(format == Format::Xml);
        assert_eq!(xml, Descriptor::default());

        let (json, format) = parse_descriptor("\n{\"subject\":\"acct:a@example.com\"}");
        assert!(format == Format::Json);
        assert_eq!(json.subject(), "acct:a@example.com");
    }

    #[test]
    fn xml_output_has_one_element_per_line() {
        let mut d = Descriptor::new("acct:a@example.com");
        d.add_alias("https://example.com/@a");
        assert_eq!(
            render(&d, Format::Xml),
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<XRD xmlns=\"http://docs.oasis-open.org/ns/xri/xrd-1.0\">\n",
                "<Subject>acct:a@example.com</Subject>\n",
                "<Alias>https://example.com/@a</Alias>\n",
                "</XRD>\n"
            )
        );
    }

    #[test]
    fn json_output_keeps_member_order() {
        let mut d = Descriptor::new("acct:a@example.com");
        d.add_alias("https://example.com/@a");
        let out = render(&d, Format::Json);
        assert!(out.find("\"subject\"").unwrap() < out.find("\"aliases\"").unwrap());
        assert!(out.ends_with("}\n"));
    }
}
