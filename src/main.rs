use anyhow::Context;
use clap::{Arg, Command};
use codesonar_gate::analysis::AnalysisService;
use codesonar_gate::auth;
use codesonar_gate::conditions::{evaluate_all, BuildOutcome};
use codesonar_gate::transport::HubSession;
use codesonar_gate::Config;
use log::LevelFilter;
use std::io::BufRead;
use std::process;

fn cli() -> Command {
    Command::new("codesonar-gate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build gate over CodeSonar hub analysis results")
        .long_about(
            "Signs in to a CodeSonar analysis hub, locates the analysis for the \n\
             current build (from the build log or the hub's project index), fetches \n\
             the warning report, and evaluates the configured gate conditions to a \n\
             build outcome.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/codesonar-gate.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .short('l')
                .long("log-file")
                .value_name("FILE")
                .help("Build log to scan for the analysis marker (defaults to stdin)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("project")
                .short('p')
                .long("project")
                .value_name("NAME")
                .help("Override the configured project name for the hub index lookup")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
}

fn main() {
    let matches = cli().get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        if let Err(e) = Config::default().to_file(generate_path) {
            eprintln!("Error generating configuration: {e}");
            process::exit(1);
        }
        println!("Default configuration written to {generate_path}");
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match Config::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        match config.validate() {
            Ok(()) => println!(
                "✅ Configuration is valid ({} gate conditions)",
                config.conditions.len()
            ),
            Err(e) => {
                println!("❌ Configuration validation failed: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let log_file = matches.get_one::<String>("log-file").map(String::as_str);
    let project = matches.get_one::<String>("project").map(String::as_str);
    match run(&config, log_file, project) {
        Ok(outcome) => {
            println!("{outcome}");
            process::exit(match outcome {
                BuildOutcome::Success => 0,
                BuildOutcome::Unstable => 1,
                BuildOutcome::Failure | BuildOutcome::Aborted => 2,
            });
        }
        Err(e) => {
            // An abort is not a gate verdict: no outcome is printed, so a
            // missing report can never read as "zero warnings".
            eprintln!("Build aborted: {e:#}");
            process::exit(2);
        }
    }
}

fn run(
    config: &Config,
    log_file: Option<&str>,
    project: Option<&str>,
) -> anyhow::Result<BuildOutcome> {
    config.validate()?;
    let base = config.hub_url()?;
    let project_name = project.unwrap_or(&config.project_name);
    let lines = read_build_log(log_file)?;

    let mut session = HubSession::anonymous()?;
    config
        .auth
        .authenticate(&mut session, &base)
        .context("hub authentication failed")?;

    let service = AnalysisService::new(&session)?;
    let analysis_url = match service.analysis_url_from_log(&lines) {
        Some(url) => url,
        None => {
            log::info!(
                "no analysis marker in the build log, consulting the hub index for '{project_name}'"
            );
            service.latest_analysis_url(&base, project_name)?
        }
    };
    log::info!("analysis report: {analysis_url}");

    let active =
        service.analysis_with_visibility_filter(&analysis_url, &config.visibility_filter)?;
    let new_warnings = service.analysis_with_new_warnings(&analysis_url)?;
    log::info!(
        "{} active warnings, {} new in this analysis",
        active.warnings.len(),
        new_warnings.warnings.len()
    );

    let outcome = evaluate_all(&active, &config.conditions);

    auth::sign_out(&session, &base)?;
    Ok(outcome)
}

fn read_build_log(path: Option<&str>) -> anyhow::Result<Vec<String>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read build log {path}"))?;
            Ok(content.lines().map(str::to_string).collect())
        }
        None => {
            let lines: Result<Vec<String>, _> = std::io::stdin().lock().lines().collect();
            Ok(lines?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_flag_overrides_the_configured_name() {
        let matches = cli().get_matches_from(["codesonar-gate", "--project", "kernel"]);
        let project = matches.get_one::<String>("project").map(String::as_str);
        assert_eq!(project, Some("kernel"));

        let config = Config::default();
        assert_eq!(project.unwrap_or(&config.project_name), "kernel");
    }

    #[test]
    fn project_lookup_falls_back_to_config_without_the_flag() {
        let matches = cli().get_matches_from(["codesonar-gate"]);
        let project = matches.get_one::<String>("project").map(String::as_str);
        assert_eq!(project, None);

        let config = Config::default();
        assert_eq!(project.unwrap_or(&config.project_name), "my-project");
    }
}
