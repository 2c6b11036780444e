//! lidar-anomaly - interactive characterization and anomaly analysis shell.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use lidar_pipeline::{
  compare, AnomalyReport, CharacterizedObject, IngestParams, ObjectCharacterizer, PipelineConfig,
};
use lidar_scanner::CsvScanner;

mod command;
mod library;

use command::{ShellCommand, HELP_TEXT};
use library::Library;

#[derive(Parser)]
#[command(name = "lidar-anomaly")]
#[command(about = "Characterize objects from a LiDAR capture and compare them against models")]
#[command(version)]
struct Cli {
  /// CSV capture to replay (timestamp_ns,x_mm,y_mm,z_mm,reflectivity)
  #[arg(short, long)]
  file: PathBuf,

  /// Directory holding saved objects and models
  #[arg(short, long, default_value = "./library")]
  library: PathBuf,

  /// Object frame duration (ms)
  #[arg(long, default_value_t = 1000)]
  obj_frame: u64,

  /// Background frame duration (ms)
  #[arg(long, default_value_t = 5000)]
  back_frame: u64,

  /// Minimum reflectivity (0-255); points below are dropped
  #[arg(long, default_value_t = 0)]
  min_reflectivity: u8,

  /// Background subtraction distance (m)
  #[arg(long, default_value_t = 0.05)]
  back_distance: f64,

  /// Verbose logging
  #[arg(short, long)]
  debug: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
    .with_target(false)
    .init();

  let params = IngestParams {
    obj_frame_ms: cli.obj_frame,
    back_frame_ms: cli.back_frame,
    min_reflectivity: cli.min_reflectivity,
    back_distance_m: cli.back_distance,
    chrono: false,
  };
  let mut characterizer = ObjectCharacterizer::new(
    CsvScanner::new(&cli.file),
    params,
    PipelineConfig::default(),
  );
  characterizer.init().context("scanner initialization")?;

  let mut library = Library::open(&cli.library)?;
  println!("lidar-anomaly shell; 'help' lists commands");

  let stdin = io::stdin();
  loop {
    print!("> ");
    io::stdout().flush()?;

    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
      break; // EOF on stdin
    }

    match ShellCommand::parse(&line) {
      ShellCommand::Exit => break,
      ShellCommand::Help => println!("{HELP_TEXT}"),
      ShellCommand::Chrono(on) => {
        characterizer.set_chrono(on);
        println!("chrono {}", if on { "on" } else { "off" });
      }
      ShellCommand::DefineBackground => match characterizer.define_background() {
        Ok(count) => println!("background frozen: {count} points"),
        Err(e) => eprintln!("error: {e}"),
      },
      ShellCommand::DefineObject(name) => match characterizer.define_object() {
        Ok(Some(object)) => {
          print_object(&name, &object);
          if let Err(e) = library.insert_object(&name, object) {
            eprintln!("error: {e:#}");
          }
        }
        Ok(None) => println!("no object detected; try again"),
        Err(e) => eprintln!("error: {e}"),
      },
      ShellCommand::Discard(ms) => match characterizer.wait(ms) {
        Ok(()) => println!("discarded {ms} ms of points"),
        Err(e) => eprintln!("error: {e}"),
      },
      ShellCommand::Set(param, value) => apply_set(&mut characterizer, &param, &value),
      ShellCommand::Object(name) => match library.object(&name) {
        Some(object) => print_object(&name, object),
        None => eprintln!("no stored object named '{name}'"),
      },
      ShellCommand::Model(name) => match library.model(&name) {
        Some(model) => print_object(&name, model),
        None => eprintln!("no stored model named '{name}'"),
      },
      ShellCommand::ModelAdd(name, object) => match library.promote_model(&name, &object) {
        Ok(()) => println!("model '{name}' added from object '{object}'"),
        Err(e) => eprintln!("error: {e:#}"),
      },
      ShellCommand::Analyze(object_name, model_name) => {
        match (library.object(&object_name), library.model(&model_name)) {
          (Some(object), Some(model)) => {
            let report = compare(object, model, &characterizer.config().compare);
            print_report(&object_name, &model_name, &report);
          }
          (None, _) => eprintln!("no stored object named '{object_name}'"),
          (_, None) => eprintln!("no stored model named '{model_name}'"),
        }
      }
      ShellCommand::Info => {
        let p = characterizer.params();
        println!("object frame      {} ms", p.obj_frame_ms);
        println!("background frame  {} ms", p.back_frame_ms);
        println!("min reflectivity  {}", p.min_reflectivity);
        println!("background dist   {} m", p.back_distance_m);
        println!("chrono            {}", p.chrono);
        println!("background set    {}", characterizer.has_background());
      }
      ShellCommand::List => {
        println!("objects: {}", library.object_names().join(", "));
        println!("models:  {}", library.model_names().join(", "));
      }
      ShellCommand::Unknown => eprintln!("unknown command; 'help' lists commands"),
    }
  }

  characterizer.stop();
  Ok(())
}

fn apply_set(characterizer: &mut ObjectCharacterizer<CsvScanner>, param: &str, value: &str) {
  let result: Result<(), ()> = match param {
    "objframe" => value
      .parse()
      .map(|v| characterizer.set_obj_frame(v))
      .map_err(drop),
    "backframe" => value
      .parse()
      .map(|v| characterizer.set_back_frame(v))
      .map_err(drop),
    "reflectivity" => value
      .parse()
      .map(|v| characterizer.set_min_reflectivity(v))
      .map_err(drop),
    "backdistance" => value
      .parse()
      .map(|v| characterizer.set_back_distance(v))
      .map_err(drop),
    _ => {
      eprintln!("unknown parameter '{param}'");
      return;
    }
  };
  match result {
    Ok(()) => println!("{param} = {value}"),
    Err(_) => eprintln!("invalid value '{value}' for {param}"),
  }
}

fn print_object(name: &str, object: &CharacterizedObject) {
  let d = object.bbox.delta();
  println!(
    "{name}: {} points, {} faces, box {:.1} x {:.1} x {:.1} mm",
    object.points.len(),
    object.faces.len(),
    d.x,
    d.y,
    d.z
  );
  for (i, face) in object.faces.iter().enumerate() {
    let [a, b] = face.sorted_extents();
    println!(
      "  face {i}: {:.1} x {:.1} mm, thickness {:.2} mm, {} points",
      a,
      b,
      face.thickness(),
      face.indices.len()
    );
  }
}

fn print_report(object_name: &str, model_name: &str, report: &AnomalyReport) {
  println!(
    "{object_name} vs {model_name}: {}",
    if report.similar { "SIMILAR" } else { "ANOMALOUS" }
  );
  println!(
    "  faces: object {} / model {} (delta {})",
    report.face_comparisons.len() + report.unmatched_object_faces.len(),
    report.face_comparisons.len() + report.unmatched_model_faces.len(),
    report.delta_faces
  );
  let g = &report.general;
  println!(
    "  box delta: {:.1} / {:.1} / {:.1} mm ({})",
    g.extent_delta.x,
    g.extent_delta.y,
    g.extent_delta.z,
    if g.similar { "ok" } else { "off" }
  );
  for p in &report.face_comparisons {
    println!(
      "  face {} -> model face {}: extent delta {:.1}/{:.1} mm, thickness delta {:.2} mm ({})",
      p.object_face,
      p.model_face,
      p.extent_delta[0],
      p.extent_delta[1],
      p.thickness_delta,
      if p.similar { "similar" } else { "different" }
    );
  }
  for &mi in &report.unmatched_model_faces {
    println!("  model face {mi}: unmatched");
  }
  for &oi in &report.unmatched_object_faces {
    println!("  object face {oi}: unmatched");
  }
}
