// main.rs
//
// Command-line front end: read a DXF drawing, run the pipeline, write the
// planned trajectory as a 5-column text stream.
//
// Usage:
//   scarapath input.dxf [output.txt] [--tol MM] [--step MM] [--z-home MM]
//             [--z-cut MM] [--speed-cut MM_MIN] [--speed-traverse MM_MIN]
//             [--accel MM_S2] [--l1 M] [--l2 M] [--rate HZ] [--mm]

use scarapath::config::PipelineConfig;
use scarapath::float_types::Real;
use scarapath::io::{self, dxf};
use scarapath::pipeline::Pipeline;
use std::fs;
use std::process::ExitCode;

struct Args {
    input: String,
    output: String,
    config: PipelineConfig,
}

fn usage() -> ExitCode {
    eprintln!(
        "usage: scarapath <input.dxf> [output.txt] [--tol MM] [--step MM] \
         [--z-home MM] [--z-cut MM] [--speed-cut MM_MIN] [--speed-traverse MM_MIN] \
         [--accel MM_S2] [--l1 M] [--l2 M] [--rate HZ] [--mm]"
    );
    ExitCode::from(2)
}

fn parse_args() -> Result<Args, ExitCode> {
    let mut config = PipelineConfig {
        export_in_meters: true,
        ..PipelineConfig::default()
    };
    let mut positional: Vec<String> = Vec::new();

    let mut argv = std::env::args().skip(1);
    while let Some(arg) = argv.next() {
        if !arg.starts_with("--") {
            positional.push(arg);
            continue;
        }
        if arg == "--mm" {
            config.export_in_meters = false;
            continue;
        }
        let Some(raw) = argv.next() else {
            eprintln!("missing value for {arg}");
            return Err(usage());
        };
        let Ok(value) = raw.parse::<Real>() else {
            eprintln!("bad value for {arg}: {raw}");
            return Err(usage());
        };
        match arg.as_str() {
            "--tol" => config.topology.tol_topo = value,
            "--step" => config.planner.step_mm = value,
            "--z-home" => config.planner.z_home = value,
            "--z-cut" => config.planner.z_cut = value,
            "--speed-cut" => config.planner.speed_cut = value,
            "--speed-traverse" => config.planner.speed_traverse = value,
            "--accel" => config.planner.accel_max = value,
            "--l1" => config.arm.l1 = value,
            "--l2" => config.arm.l2 = value,
            "--rate" => config.arm.sample_rate = value,
            _ => {
                eprintln!("unknown option {arg}");
                return Err(usage());
            },
        }
    }

    let Some(input) = positional.first().cloned() else {
        return Err(usage());
    };
    let output = positional
        .get(1)
        .cloned()
        .unwrap_or_else(|| "trajectory.txt".to_string());
    Ok(Args {
        input,
        output,
        config,
    })
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    let data = match fs::read(&args.input) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("cannot read {}: {err}", args.input);
            return ExitCode::FAILURE;
        },
    };
    let entities = match dxf::entities_from_dxf(&data) {
        Ok(entities) => entities,
        Err(err) => {
            eprintln!("cannot parse {}: {err}", args.input);
            return ExitCode::FAILURE;
        },
    };

    let pipeline = match Pipeline::new(args.config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        },
    };
    let output = match pipeline.run(&entities) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        },
    };

    let text = io::trajectory_to_string(&output.trajectory);
    if let Err(err) = fs::write(&args.output, text) {
        eprintln!("cannot write {}: {err}", args.output);
        return ExitCode::FAILURE;
    }

    println!(
        "{} entities -> {} cut groups, {} no-cut groups, {} samples -> {}",
        entities.len(),
        output.route.cut.len(),
        output.route.nocut.len(),
        output.trajectory.samples.len(),
        args.output
    );
    ExitCode::SUCCESS
}
