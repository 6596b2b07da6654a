//! meshcheck - report defects in a mesh stored as Cell0D/Cell1D/Cell2D tables.
//!
//! Defects never change the exit status, only failing to load the mesh or
//! the config does.

mod args;

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use meshcheck::{CheckConfig, load_mesh_dir, validate, write_mesh_table};
use tracing::Level;

use crate::args::{Args, Command, USAGE, parse_args};

fn main() -> ExitCode {
    let args = match parse_args(env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    init_logging(args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<Level>) {
    let Some(level) = level else {
        return;
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => CheckConfig::load_from_file(path)
            .with_context(|| format!("could not load config `{}`", path.display()))?,
        None => CheckConfig::default(),
    };

    let mesh = load_mesh_dir(&args.dir, &config)
        .with_context(|| format!("could not load mesh from `{}`", args.dir.display()))?;

    tracing::debug!(
        "loaded {} vertices, {} edges, {} faces from `{}`",
        mesh.vertices.len(),
        mesh.edges.len(),
        mesh.faces.len(),
        args.dir.display()
    );

    if let Some(table) = args.dump {
        print!("{}", write_mesh_table(&mesh, table));
    }

    let report = validate(&mesh, &config);
    for defect in report.defects() {
        eprintln!("Error: {defect}");
    }

    if args.json {
        println!("{}", report.to_json()?);
    }

    Ok(())
}
