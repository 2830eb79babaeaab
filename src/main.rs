use anyhow::{Context, Result};
use buildtrace::{
    classifier::Classifier,
    cli::{Cli, OutputFormat},
    config::AnalysisConfig,
    csv_output,
    error::AnalysisError,
    export::ArtifactExporter,
    json_output::JsonReport,
    scan::{self, Analysis},
    topo::{self, TopoOrder},
};
use clap::Parser;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` forces TRACE level
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file (if any) and layer command-line overrides on top
fn load_config(args: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Print the text report: syscall table, scan summary, optional build order
fn print_text_report(
    out: &mut impl Write,
    args: &Cli,
    analysis: &Analysis,
    order: Option<&TopoOrder>,
) -> std::io::Result<()> {
    analysis.tally.write_summary(out, args.top)?;
    writeln!(out)?;
    writeln!(out, "Lines scanned:       {}", analysis.summary.lines)?;
    writeln!(out, "Compile invocations: {}", analysis.summary.compile_invocations)?;
    writeln!(out, "Source files:        {}", analysis.graph.sources().count())?;
    writeln!(out, "Dependency edges:    {}", analysis.summary.edges)?;

    if let Some(order) = order {
        writeln!(out)?;
        writeln!(out, "Build order ({} files):", order.len())?;
        for (i, node) in order.nodes().iter().enumerate() {
            writeln!(out, "{:>5}. {}", i + 1, node)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let classifier = Classifier::new(&config.patterns)?;
    let analysis = scan::analyze_file(&config.input, &classifier)?;

    let exporter = ArtifactExporter::new(config.outputs.clone());

    // One ordering serves both the order artifact and the report
    let order = if args.order || exporter.wants_build_order() {
        Some(topo::topological_order(&analysis.graph))
    } else {
        None
    };

    exporter
        .export(&analysis, order.as_ref().and_then(|o| o.as_ref().ok()))
        .context("Failed to export artifacts")?;

    let shown = if args.order {
        order.as_ref().map(|o| match o {
            Ok(nodes) if args.headers_first => Ok(nodes.reversed()),
            Ok(nodes) => Ok(nodes.clone()),
            Err(e) => Err(e),
        })
    } else {
        None
    };

    if !args.quiet {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        match args.format {
            OutputFormat::Text => {
                let ordered = shown.as_ref().and_then(|o| o.as_ref().ok());
                print_text_report(&mut out, &args, &analysis, ordered)?;
            }
            OutputFormat::Json => {
                let mut report =
                    JsonReport::new(&config.input.display().to_string(), &analysis, args.top);
                match &shown {
                    Some(Ok(o)) => report.set_build_order(o),
                    Some(Err(AnalysisError::CycleDetected { unresolved })) => {
                        report.set_cycle(unresolved)
                    }
                    _ => {}
                }
                writeln!(out, "{}", report.to_json()?)?;
            }
            OutputFormat::Csv => {
                write!(out, "{}", csv_output::syscall_table_csv(&analysis.tally))?;
            }
        }
    }

    // A cycle is a failure even after the report and other artifacts are out
    if let Some(Err(e)) = order {
        return Err(e).context("Failed to compute build order");
    }

    Ok(())
}
