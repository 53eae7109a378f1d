use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::{debug, error, info, warn};
use radio_enabler::{
    EnablerConfig, RadioEnabler,
    config::SimulatorConfig,
    dependency::DependencyTable,
    properties::InMemoryProperties,
    simulator::SimulatedInterface,
    surface::ProjectedSurface,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const CONTROL_LABEL: &str = "Connect to WiMAX networks";
const DEPENDENCY_KEY: &str = "airplane_mode";

type ConsoleEnabler =
    RadioEnabler<SimulatedInterface, ProjectedSurface, DependencyTable, InMemoryProperties>;

enum Command {
    Toggle(bool),
    Rescan,
    Fail,
    Dependency(bool),
    Status,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["on"] => Some(Self::Toggle(true)),
            ["off"] => Some(Self::Toggle(false)),
            ["rescan"] => Some(Self::Rescan),
            ["fail"] => Some(Self::Fail),
            ["veto", "on"] => Some(Self::Dependency(true)),
            ["veto", "off"] => Some(Self::Dependency(false)),
            ["status"] => Some(Self::Status),
            _ => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    initialize();

    info!("module version: {}", env!("CARGO_PKG_VERSION"));

    let config = EnablerConfig::load()?;
    let simulator_config = SimulatorConfig::load(&config)?;
    let simulator = SimulatedInterface::new(&simulator_config);

    let mut enabler = RadioEnabler::new(
        simulator.clone(),
        ProjectedSurface::new(CONTROL_LABEL).with_dependency(DEPENDENCY_KEY),
        DependencyTable::new().with_control(DEPENDENCY_KEY, false),
        InMemoryProperties::default(),
        config,
    );

    if !enabler.is_supported() {
        warn!("radio not supported, nothing to do");
        return Ok(());
    }

    enabler.activate();
    print_projection(&enabler)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("ctrl-c");
                break;
            },
            event = enabler.next_event() => {
                let Some(event) = event else {
                    warn!("interface event stream closed");
                    break;
                };
                enabler.handle_event(event);
                print_projection(&enabler)?;
            },
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read command")? else {
                    debug!("stdin closed");
                    break;
                };

                if is_quit(&line) {
                    break;
                }

                match Command::parse(&line) {
                    Some(command) => execute(&mut enabler, &simulator, command)?,
                    None => warn!("unknown command: {line}"),
                }
            },
        }
    }

    enabler.deactivate();
    debug!("good bye");

    Ok(())
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim(), "quit" | "exit")
}

fn execute(
    enabler: &mut ConsoleEnabler,
    simulator: &SimulatedInterface,
    command: Command,
) -> Result<()> {
    match command {
        Command::Toggle(requested) => {
            if !enabler.surface().projection().enabled {
                warn!("control is disabled, request ignored");
                return Ok(());
            }
            enabler.on_user_request(requested);
        }
        Command::Rescan => {
            if !enabler.request_rescan() {
                warn!("rescan not possible");
            }
        }
        Command::Fail => simulator.fail_next_transition(),
        Command::Dependency(veto) => enabler.resolver_mut().set(DEPENDENCY_KEY, veto),
        Command::Status => {}
    }

    print_projection(enabler)
}

fn print_projection(enabler: &ConsoleEnabler) -> Result<()> {
    let projection = serde_json::to_string(enabler.surface().projection())
        .context("failed to serialize projection")?;
    println!("{projection}");
    Ok(())
}

fn initialize() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stdout).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_console_commands() {
        assert!(matches!(Command::parse("on"), Some(Command::Toggle(true))));
        assert!(matches!(Command::parse(" off "), Some(Command::Toggle(false))));
        assert!(matches!(
            Command::parse("veto on"),
            Some(Command::Dependency(true))
        ));
        assert!(matches!(Command::parse("rescan"), Some(Command::Rescan)));
        assert!(Command::parse("reboot").is_none());
    }

    #[test]
    fn quit_ends_the_session_before_parsing() {
        assert!(is_quit("quit"));
        assert!(is_quit(" exit\n"));
        assert!(!is_quit("status"));
        assert!(Command::parse("quit").is_none());
    }
}
