use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use metrics_sampler::cli::Cli;
use metrics_sampler::config::StaticConfig;
use metrics_sampler::errors::{Result, SamplerError};
use metrics_sampler::interfaces::console::{
    KeySource, LineKeys, help_banner, print_summary, run_input_loop,
};
use metrics_sampler::progress::ConsoleProgress;
use metrics_sampler::runtime::ControlSurface;
use metrics_sampler::runtime::lifetime::startup::prepare_startup;
use metrics_sampler::system::{init_logging, install_panic_hook};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(path) = cli.generate_config.as_deref() {
        return match StaticConfig::default().save_to_file(path) {
            Ok(()) => {
                println!("Sample config written to {}", path);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e.format_colored());
                ExitCode::FAILURE
            }
        };
    }

    let config = match StaticConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return ExitCode::FAILURE;
        }
    };

    // guard 必须活到进程结束，保证日志写完
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    install_panic_hook();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.format_colored());
            ExitCode::FAILURE
        }
    }
}

fn run(config: &StaticConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("metrics-sampler")
        .build()
        .map_err(|e| SamplerError::config(format!("Failed to build tokio runtime: {}", e)))?;

    let context = prepare_startup(config, Arc::new(ConsoleProgress))?;
    let mut surface = ControlSurface::new(context);

    println!(
        "{}",
        help_banner(
            config.sampler.record_interval(),
            config.sampler.report_interval()
        )
    );

    {
        let _enter = runtime.enter();
        surface.start()?;
    }

    let mut stdout = std::io::stdout();
    let mut keys = key_source();
    let input = run_input_loop(&surface, runtime.handle(), keys.as_mut(), &mut stdout);
    if let Err(e) = &input {
        warn!("Operator input stopped: {}", e);
    }

    let summary = runtime.block_on(surface.shutdown())?;
    print_summary(&mut stdout, &summary)?;
    info!("Exiting");

    // 未完成的 spawn_blocking 导出最多再等一个关闭超时
    runtime.shutdown_timeout(config.sampler.shutdown_timeout());
    input
}

#[cfg(feature = "console")]
fn key_source() -> Box<dyn KeySource> {
    use std::io::IsTerminal;

    if std::io::stdin().is_terminal() {
        Box::new(metrics_sampler::interfaces::console::TerminalKeys)
    } else {
        Box::new(LineKeys::new(std::io::stdin().lock()))
    }
}

#[cfg(not(feature = "console"))]
fn key_source() -> Box<dyn KeySource> {
    Box::new(LineKeys::new(std::io::stdin().lock()))
}
