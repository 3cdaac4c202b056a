use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mimic::{Client, ClientConfig, HeaderValue, TransportKind};

/// Send one browser-like HTTP request and print the response body.
#[derive(Debug, Parser)]
#[command(name = "mimic", version)]
struct Cli {
    url: String,

    /// Request method. Defaults to POST when form data is given.
    #[arg(short = 'X', long = "request")]
    method: Option<String>,

    /// Extra header, e.g. "Accept-Language: en"
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Form field as key=value
    #[arg(short = 'd', long = "field")]
    fields: Vec<String>,

    /// Multipart field as key=value or key=@path
    #[arg(short = 'F', long = "form")]
    form: Vec<String>,

    /// Raw request body
    #[arg(long)]
    data: Option<String>,

    /// Cookie as name=value
    #[arg(short = 'b', long = "cookie")]
    cookies: Vec<String>,

    #[arg(short = 'L', long = "location")]
    follow: bool,

    #[arg(long = "max-redirs")]
    max_redirects: Option<u32>,

    /// Use the pooling client instead of the raw socket transport
    #[arg(long)]
    native: bool,

    /// Basic credentials as user:pass
    #[arg(short = 'u', long = "user")]
    user: Option<String>,

    /// Print the status line and headers before the body
    #[arg(short = 'i', long = "include")]
    include: bool,

    /// YAML file with client defaults; MIMIC_* variables apply otherwise
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::from_yaml_file(path)?,
        None => ClientConfig::load(),
    };

    let mut client = Client::with_config(config);
    configure(&mut client, &cli);

    if !client.execute_blocking() {
        for error in client.errors() {
            eprintln!("mimic: {error}");
        }
        return Ok(ExitCode::FAILURE);
    }

    let response = client.response();
    let mut out = std::io::stdout().lock();
    if cli.include {
        writeln!(out, "{}", response.status_line())?;
        for (name, value) in response.headers().iter() {
            match value {
                HeaderValue::Single(v) => writeln!(out, "{name}: {v}")?,
                HeaderValue::Multiple(vs) => {
                    for v in vs {
                        writeln!(out, "{name}: {v}")?;
                    }
                }
            }
        }
        writeln!(out)?;
    }
    out.write_all(response.body())
        .context("failed to write response body")?;
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}

fn configure(client: &mut Client, cli: &Cli) {
    let request = client.request_mut();
    request.set_target(&cli.url);

    for line in &cli.headers {
        request.add_header_line(line);
    }
    for fragment in &cli.cookies {
        request.add_cookie_str(fragment);
    }

    for field in cli.fields.iter().chain(&cli.form) {
        let (name, value) = field.split_once('=').unwrap_or((field.as_str(), ""));
        request.set_param(name, value);
    }
    if let Some(data) = &cli.data {
        request.set_raw_body(data.as_bytes());
    }

    let has_body = !cli.fields.is_empty() || !cli.form.is_empty() || cli.data.is_some();
    if !cli.form.is_empty() {
        request.submit_multipart("form-data");
    }
    match &cli.method {
        Some(method) => {
            request.set_method(method);
        }
        None if has_body => {
            request.set_method("POST");
        }
        None => {}
    }

    if let Some(user) = &cli.user {
        let (name, password) = user.split_once(':').unwrap_or((user.as_str(), ""));
        request.set_auth(name, password);
    }
    if cli.follow || cli.max_redirects.is_some() {
        request.set_follow_redirect(true, cli.max_redirects);
    }
    if cli.native {
        request.set_transport(TransportKind::Native);
    }
}
