mod error;
mod scenario;

use clap::{Args, Parser, Subcommand};
use error::CliResult;
use rv_model::{Curve, ShaftCurve, efficiency_curve, motor_curve, reducer_output_curve};
use rv_sim::simulate_rover_with;
use rv_solver::{
    SweepDefinition, TopSpeed, TopSpeedConfig, TopSpeedGrid, TopSpeedSweep, crr_sweep,
    grid_sweep, slope_sweep, top_speed_with,
};
use scenario::Scenario;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rv-cli")]
#[command(about = "Rover longitudinal dynamics: top speed, sweeps and traverse simulation", long_about = None)]
struct Cli {
    /// Scenario YAML file (defaults to the reference rover and experiment)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Terminal velocity at one terrain angle and Crr
    TopSpeed {
        /// Terrain angle in degrees, positive uphill
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        slope: f64,
        /// Coefficient of rolling resistance
        #[arg(long, default_value_t = 0.2)]
        crr: f64,
    },
    /// Top speed over a range of terrain angles and/or Crr
    #[command(subcommand)]
    Sweep(SweepCommands),
    /// Simulate a traverse of the scenario terrain
    Simulate,
    /// Sample characteristic curves
    #[command(subcommand)]
    Curves(CurveCommands),
}

#[derive(Subcommand)]
enum SweepCommands {
    /// Vary the terrain angle at fixed Crr
    Slope {
        #[command(flatten)]
        range: RangeArgs,
        /// Coefficient of rolling resistance
        #[arg(long, default_value_t = 0.2)]
        crr: f64,
    },
    /// Vary Crr at a fixed terrain angle
    Crr {
        #[command(flatten)]
        range: RangeArgs,
        /// Terrain angle in degrees
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        slope: f64,
    },
    /// Every (terrain angle, Crr) pair of the default ranges
    Grid {
        /// Points along each axis
        #[arg(long)]
        points: Option<usize>,
    },
}

#[derive(Args)]
struct RangeArgs {
    /// First sweep value
    #[arg(long, allow_hyphen_values = true)]
    start: Option<f64>,
    /// Last sweep value
    #[arg(long, allow_hyphen_values = true)]
    end: Option<f64>,
    /// Number of points
    #[arg(long)]
    points: Option<usize>,
}

impl RangeArgs {
    fn resolve(&self, default: SweepDefinition) -> CliResult<SweepDefinition> {
        Ok(SweepDefinition::new(
            self.start.unwrap_or(default.start),
            self.end.unwrap_or(default.end),
            self.points.unwrap_or(default.num_points),
        )?)
    }
}

#[derive(Subcommand)]
enum CurveCommands {
    /// Motor speed, torque and power
    Motor {
        #[arg(long, default_value_t = 20)]
        points: usize,
    },
    /// Speed reducer output speed, torque and power
    Reducer {
        #[arg(long, default_value_t = 20)]
        points: usize,
    },
    /// Terrain angle against distance
    Terrain {
        #[arg(long, default_value_t = 101)]
        points: usize,
    },
    /// Motor efficiency against torque
    Efficiency {
        #[arg(long, default_value_t = 101)]
        points: usize,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = Scenario::load(cli.config.as_deref())?;
    let json = cli.json;

    match cli.command {
        Commands::TopSpeed { slope, crr } => cmd_top_speed(&scenario, slope, crr, json),
        Commands::Sweep(sweep) => cmd_sweep(&scenario, sweep, json),
        Commands::Simulate => cmd_simulate(&scenario, json),
        Commands::Curves(curve) => cmd_curves(&scenario, curve, json),
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_top_speed(scenario: &Scenario, slope: f64, crr: f64, json: bool) -> CliResult<()> {
    let result = top_speed_with(
        &scenario.rover,
        &scenario.planet,
        slope,
        crr,
        &TopSpeedConfig::default(),
    )?;
    if json {
        return print_json(&result);
    }

    println!("Terrain angle: {slope} deg, Crr: {crr}");
    match result {
        TopSpeed::Equilibrium(v) => println!("Top speed: {v:.6} m/s"),
        TopSpeed::Stalled => println!("Top speed: 0 m/s (rover cannot move)"),
        TopSpeed::Runaway => println!("Top speed: none (net force stays positive)"),
    }
    Ok(())
}

fn cmd_sweep(scenario: &Scenario, sweep: SweepCommands, json: bool) -> CliResult<()> {
    let config = TopSpeedConfig::default();
    let (rover, planet) = (&scenario.rover, &scenario.planet);
    let started = Instant::now();

    match sweep {
        SweepCommands::Slope { range, crr } => {
            let slopes = range.resolve(SweepDefinition::slopes())?;
            info!(%slopes, crr, "slope sweep");
            let result = slope_sweep(rover, planet, &slopes, crr, &config)?;
            info!(elapsed_s = started.elapsed().as_secs_f64(), "sweep finished");
            if json {
                return print_json(&result);
            }
            println!("Crr = {crr}");
            print_sweep(&result, "slope [deg]");
        }
        SweepCommands::Crr { range, slope } => {
            let crr = range.resolve(SweepDefinition::rolling_resistance())?;
            info!(%crr, slope, "Crr sweep");
            let result = crr_sweep(rover, planet, &crr, slope, &config)?;
            info!(elapsed_s = started.elapsed().as_secs_f64(), "sweep finished");
            if json {
                return print_json(&result);
            }
            println!("Terrain angle = {slope} deg");
            print_sweep(&result, "Crr");
        }
        SweepCommands::Grid { points } => {
            let mut slopes = SweepDefinition::slopes();
            let mut crr = SweepDefinition::rolling_resistance();
            if let Some(n) = points {
                slopes.num_points = n;
                crr.num_points = n;
            }
            info!(%slopes, %crr, "grid sweep");
            let result = grid_sweep(rover, planet, &slopes, &crr, &config)?;
            info!(elapsed_s = started.elapsed().as_secs_f64(), "sweep finished");
            if json {
                return print_json(&result);
            }
            print_grid(&result);
        }
    }
    Ok(())
}

fn print_sweep(sweep: &TopSpeedSweep, label: &str) {
    println!("{label:>12}  {:>12}", "v_max [m/s]");
    for (x, v) in sweep.values.iter().zip(&sweep.top_speed) {
        println!("{x:>12.4}  {v:>12.6}");
    }
}

fn print_grid(grid: &TopSpeedGrid) {
    print!("{:>10}", "slope\\Crr");
    for c in &grid.crr {
        print!(" {c:>8.4}");
    }
    println!();
    for (slope, row) in grid.slopes_deg.iter().zip(&grid.top_speed) {
        print!("{slope:>10.3}");
        for v in row {
            print!(" {v:>8.4}");
        }
        println!();
    }
    println!("Runaway cells: {}", grid.runaway_count());
}

fn cmd_simulate(scenario: &Scenario, json: bool) -> CliResult<()> {
    let started = Instant::now();
    let telemetry = simulate_rover_with(
        &scenario.rover,
        &scenario.planet,
        &scenario.experiment,
        &scenario.end_conditions,
        &scenario.solver,
    )?;
    info!(
        elapsed_s = started.elapsed().as_secs_f64(),
        samples = telemetry.len(),
        "simulation finished"
    );

    if json {
        return print_json(&telemetry);
    }
    for line in telemetry.summary_lines() {
        println!("{line}");
    }
    Ok(())
}

fn cmd_curves(scenario: &Scenario, curve: CurveCommands, json: bool) -> CliResult<()> {
    let rover = &scenario.rover;
    match curve {
        CurveCommands::Motor { points } => {
            print_shaft_curve(&motor_curve(rover, points)?, json)
        }
        CurveCommands::Reducer { points } => {
            print_shaft_curve(&reducer_output_curve(rover, points)?, json)
        }
        CurveCommands::Terrain { points } => {
            let terrain = scenario.experiment.terrain_profile()?;
            let (x, y) = terrain.sample(points);
            print_curve(&Curve { x, y }, ("distance [m]", "angle [deg]"), json)
        }
        CurveCommands::Efficiency { points } => print_curve(
            &efficiency_curve(rover, points)?,
            ("torque [N·m]", "efficiency"),
            json,
        ),
    }
}

fn print_shaft_curve(curve: &ShaftCurve, json: bool) -> CliResult<()> {
    if json {
        return print_json(curve);
    }
    println!(
        "{:>14}  {:>14}  {:>12}",
        "speed [rad/s]", "torque [N·m]", "power [W]"
    );
    for ((w, tau), p) in curve.speed.iter().zip(&curve.torque).zip(&curve.power) {
        println!("{w:>14.4}  {tau:>14.4}  {p:>12.4}");
    }
    if let Some((w, p)) = curve.peak_power() {
        println!("Peak power: {p:.3} W at {w:.4} rad/s");
    }
    Ok(())
}

fn print_curve(curve: &Curve, labels: (&str, &str), json: bool) -> CliResult<()> {
    if json {
        return print_json(curve);
    }
    println!("{:>14}  {:>14}", labels.0, labels.1);
    for (x, y) in curve.x.iter().zip(&curve.y) {
        println!("{x:>14.4}  {y:>14.6}");
    }
    Ok(())
}
