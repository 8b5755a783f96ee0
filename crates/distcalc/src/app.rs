//! Application entry point and dispatch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use distcalc_agent::{AgentServer, ComputeService, LocalComputeClient, TcpComputeClient};
use distcalc_cli::presenter::CLIResultPresenter;
use distcalc_core::constants::exit_codes;
use distcalc_core::{CalcError, ComputeClient, ExpressionId};
use distcalc_orchestration::interfaces::ResultPresenter;
use distcalc_orchestration::{Evaluator, StatusStore};

use crate::config::{AppConfig, Command};
use crate::errors::handle_error;

/// Run the application and return the process exit code.
pub fn run(config: &AppConfig) -> Result<i32> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        distcalc_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(exit_codes::SUCCESS);
    }

    let presenter = CLIResultPresenter::new(config.verbose, config.quiet);
    match &config.command {
        Some(Command::Agent {
            listen,
            idle_timeout,
        }) => run_agent(config, listen, *idle_timeout),
        Some(Command::Eval {
            expressions,
            agent,
            details,
        }) => run_eval(config, &presenter, expressions, agent.as_deref(), *details),
        Some(Command::List) => {
            let store = open_store(config, "list")?;
            presenter.present_expressions(&store.list(&config.owner()));
            Ok(exit_codes::SUCCESS)
        }
        Some(Command::Get { id }) => {
            let store = open_store(config, "get")?;
            let id = ExpressionId::new(id.as_str());
            let expression = store.get(&id, &config.owner()).map_err(CalcError::from)?;
            presenter.present_expression(&expression, &store.operations(&id, &config.owner()));
            Ok(exit_codes::SUCCESS)
        }
        Some(Command::Clear) => {
            let store = open_store(config, "clear")?;
            let removed = store.clear(&config.owner());
            save_store(config, &store)?;
            presenter.present_cleared(removed);
            Ok(exit_codes::SUCCESS)
        }
        None => {
            let mut cmd = <AppConfig as clap::CommandFactory>::command();
            cmd.print_help()?;
            Ok(exit_codes::ERROR_GENERIC)
        }
    }
}

fn run_agent(config: &AppConfig, listen: &str, idle_timeout: Duration) -> Result<i32> {
    let service = Arc::new(ComputeService::new(config.compute_config()?));
    let server = AgentServer::bind(listen, service)?.with_idle_timeout(idle_timeout);
    let addr = server.local_addr()?;
    if !config.quiet {
        println!("distcalc agent listening on {addr}");
    }
    server.serve()?;
    Ok(exit_codes::SUCCESS)
}

fn run_eval(
    config: &AppConfig,
    presenter: &dyn ResultPresenter,
    expressions: &[String],
    agent: Option<&str>,
    details: bool,
) -> Result<i32> {
    let client: Arc<dyn ComputeClient> = match agent {
        Some(addr) => Arc::new(TcpComputeClient::new(addr).with_timeout(config.timeout)),
        None => {
            let service = ComputeService::new(config.compute_config()?);
            Arc::new(LocalComputeClient::new(Arc::new(service)))
        }
    };
    debug!(endpoint = %client.endpoint(), count = expressions.len(), "evaluating");

    let store = Arc::new(match &config.store {
        Some(path) => StatusStore::open(path)
            .with_context(|| format!("failed to open store {}", path.display()))?,
        None => StatusStore::new(),
    });
    let evaluator = Evaluator::new(Arc::clone(&store), client);
    let owner = config.owner();

    let mut code = exit_codes::SUCCESS;
    for expression in expressions {
        let report = evaluator.evaluate_tracked(expression, &owner);
        presenter.present_evaluation(&report, details);
        if let Err(err) = &report.outcome {
            if code == exit_codes::SUCCESS {
                code = handle_error(err);
            }
        }
    }

    save_store(config, &store)?;
    Ok(code)
}

/// Open the snapshot store that `command` reads from.
fn open_store(config: &AppConfig, command: &str) -> Result<StatusStore> {
    let Some(path) = &config.store else {
        return Err(CalcError::Config(format!("{command} requires --store or DISTCALC_STORE")).into());
    };
    StatusStore::open(path).with_context(|| format!("failed to open store {}", path.display()))
}

fn save_store(config: &AppConfig, store: &StatusStore) -> Result<()> {
    if let Some(path) = &config.store {
        store
            .save_to_path(path)
            .with_context(|| format!("failed to save store {}", path.display()))?;
    }
    Ok(())
}
