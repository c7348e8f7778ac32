use clap::{Parser, Subcommand};
use ps_app::{
    AppResult, SeriesAnalyzer, SeriesRunner, SweepProgressEvent, SweepStage, load_plan,
};
use ps_results::{SensorReader, export_csv};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ps-cli")]
#[command(about = "paramsweep CLI - run parameter sweeps of an external simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every combination of a sweep plan
    Run {
        /// Path to the sweep plan YAML file
        plan_path: PathBuf,
        /// Simulator executable (overrides the plan)
        #[arg(long)]
        executable: Option<PathBuf>,
        /// Output root directory (overrides the plan); must not exist
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the instances a plan would run, without running them
    Preview {
        /// Path to the sweep plan YAML file
        plan_path: PathBuf,
    },
    /// Show statistics of a sensor log
    Sensor {
        /// Path to the sensor log
        sensor_path: PathBuf,
        /// Only this field (defaults to all fields)
        #[arg(short, long)]
        field: Option<String>,
    },
    /// Summarize one sensor field over every instance of a sweep
    Analyze {
        /// Documentation file or sweep output directory
        docs_path: PathBuf,
        /// Sensor log file name inside each instance directory
        #[arg(long)]
        sensor: String,
        /// Field name to summarize
        #[arg(long)]
        field: String,
        /// Skip instances whose simulator failed
        #[arg(long)]
        succeeded_only: bool,
    },
    /// Export documentation records as `;`-separated CSV
    ExportDocs {
        /// Documentation file or sweep output directory
        docs_path: PathBuf,
        /// Output CSV file path
        output: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            plan_path,
            executable,
            output,
        } => cmd_run(&plan_path, executable, output),
        Commands::Preview { plan_path } => cmd_preview(&plan_path),
        Commands::Sensor { sensor_path, field } => cmd_sensor(&sensor_path, field.as_deref()),
        Commands::Analyze {
            docs_path,
            sensor,
            field,
            succeeded_only,
        } => cmd_analyze(&docs_path, &sensor, &field, succeeded_only),
        Commands::ExportDocs { docs_path, output } => cmd_export_docs(&docs_path, &output),
    }
}

fn cmd_run(plan_path: &Path, executable: Option<PathBuf>, output: Option<PathBuf>) -> AppResult<()> {
    let mut plan = load_plan(plan_path)?;
    if let Some(executable) = executable {
        plan.executable = executable;
    }
    if let Some(output) = output {
        plan.output = output;
    }
    tracing::debug!(plan = %plan_path.display(), template = %plan.template.display(), "loaded sweep plan");

    let mut runner = SeriesRunner::from_plan(&plan)?;
    println!(
        "Running {} instances of {} into {}",
        runner.total_instances(),
        plan.executable.display(),
        plan.output.display()
    );

    let mut last_emit = Instant::now();
    let mut last_stage = SweepStage::Completed;
    let summary = runner.evaluate_with_progress(Some(&mut |event| {
        let emit_now = event.stage != last_stage || last_emit.elapsed().as_millis() >= 100;
        if emit_now {
            render_cli_progress(&event);
            last_stage = event.stage.clone();
            last_emit = Instant::now();
        }
    }))?;
    clear_progress_line();

    println!("✓ Sweep completed: {}", summary.sweep_id);
    println!("  Instances: {}", summary.instances);
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed:    {}", summary.failed);
    println!("  Documentation: {}", summary.documentation_path.display());
    Ok(())
}

fn cmd_preview(plan_path: &Path) -> AppResult<()> {
    let plan = load_plan(plan_path)?;
    let runner = SeriesRunner::from_plan(&plan)?;
    let instances = runner.preview();

    println!("{} instances:", instances.len());
    for (id, assignment) in instances {
        let values: Vec<String> = assignment
            .iter()
            .map(|a| format!("{}={}", a.path, a.value))
            .collect();
        println!("  {}  {}", id.stem(), values.join("  "));
    }
    Ok(())
}

fn cmd_sensor(sensor_path: &Path, field: Option<&str>) -> AppResult<()> {
    let sensor = SensorReader::open(sensor_path)?;
    println!("Sensor '{}': {} rows", sensor.name(), sensor.len());

    let fields: Vec<&str> = match field {
        Some(field) => vec![field],
        None => sensor
            .definitions()
            .iter()
            .map(|d| d.field_name.as_str())
            .collect(),
    };
    for field in fields {
        let mean = sensor.get_data_mean(field)?;
        println!(
            "  {}: mean={:.6}  min={}  max={}  var={}",
            field,
            mean,
            format_optional(sensor.get_data_min(field).ok()),
            format_optional(sensor.get_data_max(field).ok()),
            format_optional(sensor.get_data_sample_variance(field).ok()),
        );
    }
    Ok(())
}

fn cmd_analyze(docs_path: &Path, sensor: &str, field: &str, succeeded_only: bool) -> AppResult<()> {
    let mut analyzer = SeriesAnalyzer::open(docs_path, [sensor])?;
    if succeeded_only {
        analyzer = analyzer.only_succeeded();
    }

    let summaries = analyzer.summarize(field)?;
    if summaries.is_empty() {
        println!("No instances to analyze");
        return Ok(());
    }

    println!("{} over {} instances:", field, summaries.len());
    for s in summaries {
        let parameters: Vec<String> = s
            .parameters
            .iter()
            .map(|(path, value)| format!("{}={}", path, value))
            .collect();
        println!(
            "  {}  {}  n={}  mean={:.6}  max={}  var={}",
            s.instance_id.stem(),
            parameters.join(" "),
            s.samples,
            s.mean,
            format_optional(s.max),
            format_optional(s.sample_variance),
        );
    }
    Ok(())
}

fn cmd_export_docs(docs_path: &Path, output: &Path) -> AppResult<()> {
    let analyzer = SeriesAnalyzer::open(docs_path, Vec::<String>::new())?;
    export_csv(analyzer.records(), output)?;
    println!(
        "✓ Exported {} records to {}",
        analyzer.records().len(),
        output.display()
    );
    Ok(())
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.6}", v))
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &SweepProgressEvent) {
    let width = 28usize;
    let fraction = event.fraction_complete();
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    let mut line = format!(
        "\r[{}] {}/{}  phase={}  elapsed={:.1}s",
        bar,
        event.completed,
        event.total,
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(id) = event.instance_id {
        line.push_str(&format!("  {}", id.stem()));
    }
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}
