use clap::Parser;
use plotters::prelude::*;
use ringrace::core::handle_race::handle_race;
use ringrace::core::race::RaceContext;
use ringrace::interfaces::hud_interface::RgbColor;
use ringrace::post::race_result::RaceResult;
use ringrace::pre::read_sim_pars::{read_sim_pars, SimPars};
use ringrace::pre::sim_opts::SimOpts;
use std::f64::consts::PI;
use std::thread;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Number of points used to draw each track ellipse.
const NO_ELLIPSE_POINTS: usize = 360;

fn plot_color(color: RgbColor) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

/// export_trajectory_plot draws the track and both cars' paths into output/trajectory.png. Screen
/// coordinates grow downwards, so y is flipped for the plot.
fn export_trajectory_plot(result: &RaceResult, context: &RaceContext) -> anyhow::Result<String> {
    let out_dir = std::path::Path::new("output");
    std::fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join("trajectory.png");

    let track = context.track();
    let margin = 20.0;
    let x_range = (track.outer_rect.left() - margin)..(track.outer_rect.right() + margin);
    let y_range = (-track.outer_rect.bottom() - margin)..(-track.outer_rect.top() + margin);

    let root = BitMapBackend::new(&out_path, (1000, 850)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "{} laps ({} discarded), {} collisions",
                result.laps, result.discarded_laps, result.no_collisions
            ),
            ("sans-serif", 24).into_font(),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("-y")
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    // track
    for ellipse in [track.outer_ellipse(), track.inner_ellipse()] {
        let outline = (0..=NO_ELLIPSE_POINTS).map(|i| {
            let p = ellipse.point_at(2.0 * PI * i as f64 / NO_ELLIPSE_POINTS as f64);
            (p.x, -p.y)
        });
        chart.draw_series(LineSeries::new(outline, BLACK.stroke_width(2)))?;
    }

    let midline = context
        .waypoints()
        .iter()
        .chain(context.waypoints().first())
        .map(|wp| (wp.x, -wp.y));
    chart
        .draw_series(LineSeries::new(midline, RGBColor(180, 180, 180)))?
        .label("waypoints")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RGBColor(180, 180, 180)));

    let line = track.start_line;
    chart.draw_series(std::iter::once(Rectangle::new(
        [(line.left(), -line.top()), (line.right(), -line.bottom())],
        RGBColor(255, 165, 0).mix(0.5).filled(),
    )))?;

    // cars
    for (label, path, color) in [
        ("player", &result.player_path, plot_color(result.player_color)),
        ("AI", &result.ai_path, plot_color(result.ai_color)),
    ] {
        chart
            .draw_series(LineSeries::new(path.iter().map(|&(x, y)| (x, -y)), color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .label_font(("sans-serif", 16))
        .position(plotters::chart::SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(out_path.to_string_lossy().into_owned())
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    let default_level = if sim_opts.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    // get simulation parameters
    let mut sim_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        println!("INFO: Reading simulation parameters from {:?}", parfile_path);
        read_sim_pars(parfile_path)?
    } else {
        println!("INFO: No parameter file provided, using the standard race");
        SimPars::default()
    };

    if let Some(timestep_size) = sim_opts.timestep_size {
        sim_pars.race_pars.timestep_size = timestep_size;
    }

    println!(
        "INFO: Simulating {} ticks with a time step size of {:.4}s ({} waypoints)",
        sim_opts.no_ticks, sim_pars.race_pars.timestep_size, sim_pars.track_pars.no_waypoints
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();

    let race_result = if !sim_opts.gui {
        println!("INFO: Running simulation without HUD...");
        handle_race(
            &sim_pars,
            sim_opts.no_ticks,
            sim_opts.seed,
            sim_opts.debug,
            None,
            1.0,
            sim_opts.telemetry_path.as_deref(),
        )?
    } else {
        println!("INFO: Starting real-time simulation with HUD...");

        // channel between the simulation thread and the HUD
        let (tx, rx) = flume::unbounded();

        let sim_opts_thread = sim_opts.clone();
        let sim_pars_thread = sim_pars.clone();
        let sim_thread = thread::spawn(move || {
            handle_race(
                &sim_pars_thread,
                sim_opts_thread.no_ticks,
                sim_opts_thread.seed,
                sim_opts_thread.debug,
                Some(&tx),
                sim_opts_thread.realtime_factor,
                sim_opts_thread.telemetry_path.as_deref(),
            )
        });

        // HUD runs on the main thread until the simulation thread drops the sender
        for race_state in rx.iter() {
            if race_state.final_result.is_none() {
                println!("{}", race_state.hud_line());
            }
        }

        sim_thread
            .join()
            .map_err(|_| anyhow::anyhow!("Simulation thread panicked!"))??
    };

    println!("INFO: Execution time: {}ms", t_start.elapsed().as_millis());

    // POST-PROCESSING -----------------------------------------------------------------------------
    race_result.print_lap_times();

    let result_path = race_result.write_to_file(sim_opts.result_path.as_deref())?;
    println!("INFO: Results written to {}", result_path);

    if let Some(telemetry_path) = &sim_opts.telemetry_path {
        println!("INFO: Telemetry written to {:?}", telemetry_path);
    }

    if sim_opts.plot {
        let context = RaceContext::new(&sim_pars.track_pars)?;
        match export_trajectory_plot(&race_result, &context) {
            Ok(path) => println!("INFO: Trajectory plot written to {}", path),
            Err(e) => eprintln!("WARNING: Could not write trajectory plot: {}", e),
        }
    }

    Ok(())
}
