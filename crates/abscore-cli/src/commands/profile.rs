use crate::cli::{ProfileArgs, ProfileCommands};
use crate::config::builder::load_profile_file;
use crate::error::{CliError, Result};
use abscore::core::models::ids::ChallengeId;
use abscore::core::profile::file::ProfileSetFile;
use abscore::core::profile::{Bound, ProfileRegistry, Transform, WeightProfile};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn run(args: ProfileArgs) -> Result<()> {
    match args.command {
        ProfileCommands::Show {
            challenge,
            profiles,
        } => handle_show(challenge.as_deref(), profiles.as_deref()),
        ProfileCommands::Export { output } => handle_export(output),
        ProfileCommands::Check { path } => handle_check(&path),
    }
}

fn handle_show(challenge: Option<&str>, profiles: Option<&Path>) -> Result<()> {
    let file = match profiles {
        Some(path) => load_profile_file(path)?,
        None => ProfileSetFile::builtin(),
    };
    let registry = ProfileRegistry::from_file_config(&file)?;

    match challenge {
        Some(name) => {
            let profile = registry.weights_for(&ChallengeId::new(name))?;
            print!("{}", render_profile(profile));
        }
        None => {
            for profile in registry.profiles() {
                print!("{}", render_profile(profile));
            }
        }
    }
    Ok(())
}

fn handle_export(output: Option<PathBuf>) -> Result<()> {
    let content = ProfileSetFile::builtin()
        .to_toml_string()
        .map_err(|e| CliError::Config(format!("Failed to serialize profiles: {}", e)))?;
    match output {
        Some(path) => {
            fs::write(&path, content)?;
            info!("Exported built-in profiles to {:?}", &path);
            println!("✓ Built-in profiles written to: {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn handle_check(path: &Path) -> Result<()> {
    let registry = ProfileRegistry::load(path)?;
    let names = registry
        .challenges()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "✓ {} is valid: {} profile(s) ({})",
        path.display(),
        registry.len(),
        names
    );
    Ok(())
}

/// Human-readable summary of a resolved profile with its effective weights.
pub fn render_profile(profile: &WeightProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Profile '{}'", profile.challenge());
    for category in profile.categories() {
        let _ = writeln!(out, "  {:<16} {:>6.2}", category.id(), category.weight());
        for metric in category.metrics() {
            let _ = writeln!(
                out,
                "    {:<16} {:>6.2}  {}  valid {}",
                metric.id(),
                metric.weight(),
                describe_transform(metric.transform()),
                metric.valid_range()
            );
        }
    }
    if !profile.gates().is_empty() {
        let _ = writeln!(out, "  gates");
        for gate in profile.gates() {
            let _ = writeln!(
                out,
                "    {:<16} {:<18} \"{}\"",
                gate.metric(),
                describe_bound(gate.bound()),
                gate.reason()
            );
        }
    }
    out
}

fn describe_transform(transform: &Transform) -> String {
    let kind = match transform {
        Transform::Linear { .. } => "linear".to_string(),
        Transform::Piecewise { knots } => format!("piecewise({})", knots.len()),
    };
    let (low, high) = transform.bounds();
    format!("{} [{}, {}] {:?}", kind, low, high, transform.direction())
}

fn describe_bound(bound: Bound) -> String {
    match bound {
        Bound::AtLeast(t) => format!(">= {}", t),
        Bound::AtMost(t) => format!("<= {}", t),
        Bound::Above(t) => format!("> {}", t),
        Bound::Below(t) => format!("< {}", t),
    }
}
