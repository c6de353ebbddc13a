//! `dashgen` command-line front end.
//!
//! ```text
//! dashgen compile layout.json --profile reterminal_e1001 -o dashboard.yaml
//! dashgen import dashboard.yaml
//! dashgen widgets --json
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dashgen_codegen::CompileOptions;
use dashgen_compiler::{compile_device, parse_layout, parse_options, resolve_profile};
use dashgen_types::{Severity, BUILTIN_PROFILES};

#[derive(Parser, Debug)]
#[command(author, version, about = "dashgen - compile dashboard layouts into ESPHome snippets", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a page or device layout into a YAML snippet
    Compile {
        /// Layout or single-page JSON file
        layout: PathBuf,

        /// Built-in profile name or profile JSON file
        #[arg(long, short, default_value = "reterminal_e1001")]
        profile: String,

        /// Compile options JSON file
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full JSON result instead of the snippet
        #[arg(long)]
        json: bool,
    },
    /// Rebuild a layout JSON from a generated snippet
    Import {
        /// Snippet YAML file
        snippet: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List widget kinds and their properties
    Widgets {
        /// Print the JSON catalog
        #[arg(long)]
        json: bool,
    },
    /// List the built-in device profiles
    Profiles,
}

fn init_logging() {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filter) => {
            builder.parse_filters(&filter);
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Info);
        }
    }
    builder.init();
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();
    match run(args.command) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Compile {
            layout,
            profile,
            options,
            output,
            json,
        } => compile(&layout, &profile, options.as_deref(), output.as_deref(), json),
        Commands::Import { snippet, output } => {
            let text = read(&snippet)?;
            let layout = dashgen_compiler::import_snippet(&text)
                .with_context(|| format!("cannot import {}", snippet.display()))?;
            let json = serde_json::to_string_pretty(&layout)?;
            write(output.as_deref(), &json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Widgets { json } => {
            if json {
                println!("{}", dashgen_compiler::generate_catalog()?);
            } else {
                print!("{}", dashgen_compiler::generate_summary());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Profiles => {
            for name in BUILTIN_PROFILES {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn compile(
    layout: &Path,
    profile: &str,
    options: Option<&Path>,
    output: Option<&Path>,
    json: bool,
) -> Result<ExitCode> {
    let layout_json = read(layout)?;
    let profile = load_profile(profile)?;
    let options = match options {
        Some(path) => parse_options(&read(path)?)?,
        None => CompileOptions::default(),
    };

    if json {
        let result = dashgen_compiler::compile_to_result(
            &layout_json,
            &serde_json::to_string(&profile)?,
            &serde_json::to_string(&options)?,
        );
        write(output, &serde_json::to_string_pretty(&result)?)?;
        return Ok(if result.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let layout = parse_layout(&layout_json)?;
    let compiled = compile_device(&layout, &profile, &options)?;
    for diagnostic in compiled.diagnostics().iter() {
        match diagnostic.severity {
            Severity::Info => log::info!("{diagnostic}"),
            Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Error => log::error!("{diagnostic}"),
        }
    }
    log::info!("digest {}", compiled.digest());
    write(output, &compiled.snippet.text)?;
    Ok(ExitCode::SUCCESS)
}

/// A built-in profile name, or a path to a profile JSON file.
fn load_profile(profile: &str) -> Result<dashgen_types::DeviceProfile> {
    let path = Path::new(profile);
    if path.is_file() {
        return Ok(resolve_profile(&read(path)?)?);
    }
    match resolve_profile(profile) {
        Ok(p) => Ok(p),
        Err(e) => bail!("{e} (built-in profiles: {})", BUILTIN_PROFILES.join(", ")),
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn write(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_defaults() {
        let args = Args::try_parse_from(["dashgen", "compile", "layout.json"]).unwrap();
        match args.command {
            Commands::Compile {
                layout,
                profile,
                options,
                output,
                json,
            } => {
                assert_eq!(layout, PathBuf::from("layout.json"));
                assert_eq!(profile, "reterminal_e1001");
                assert!(options.is_none() && output.is_none() && !json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_profile_lists_builtins() {
        let err = load_profile("toaster").unwrap_err().to_string();
        assert!(err.contains("unknown profile 'toaster'"));
        assert!(err.contains("esp32_s3_lvgl_480"));
    }

    #[test]
    fn import_requires_a_file() {
        assert!(Args::try_parse_from(["dashgen", "import"]).is_err());
    }
}
