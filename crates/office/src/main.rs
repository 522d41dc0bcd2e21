use engine::{MetricsHandle, Stage};
use office::{resolve_tuning, run_demo, DemoLoopConfig, DemoScript, OfficeScene};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const SEED_ENV_VAR: &str = "ATRIUM_SEED";
const DEMO_TICKS_ENV_VAR: &str = "ATRIUM_DEMO_TICKS";
const DEFAULT_DEMO_SEED: u64 = 0x0ff1_ce;

fn main() {
    init_tracing();
    info!("=== Atrium office demo ===");

    let tuning = match resolve_tuning() {
        Ok(tuning) => tuning,
        Err(err) => {
            error!(error = %err, "startup_failed");
            std::process::exit(1);
        }
    };

    let seed = parse_u64_env(SEED_ENV_VAR, DEFAULT_DEMO_SEED);
    let mut scene = match OfficeScene::new(tuning, seed) {
        Ok(scene) => scene,
        Err(err) => {
            error!(error = %err, "startup_failed");
            std::process::exit(1);
        }
    };

    let config = DemoLoopConfig {
        max_sim_ticks: parse_u64_env(DEMO_TICKS_ENV_VAR, DemoLoopConfig::default().max_sim_ticks),
        ..DemoLoopConfig::default()
    };
    let mut stage = Stage::default();
    let mut script = DemoScript::standard();
    let metrics_handle = MetricsHandle::default();

    run_demo(&config, &mut scene, &mut stage, &mut script, &metrics_handle);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_u64_env(var: &'static str, fallback: u64) -> u64 {
    match std::env::var(var) {
        Ok(value) => match value.parse::<u64>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    env_var = var,
                    value = value.as_str(),
                    "invalid env var value; falling back to default"
                );
                fallback
            }
        },
        Err(std::env::VarError::NotPresent) => fallback,
        Err(err) => {
            warn!(
                env_var = var,
                error = %err,
                "unable to read env var; falling back to default"
            );
            fallback
        }
    }
}
