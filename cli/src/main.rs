use std::{
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use semforge_compiler::{
    CompileRequest, Compiler, ContextFrame, ContextMemory, OutputFormat, PipelineTelemetry,
};
use semforge_lexicon::DefinitionResolver;
use shared_event_bus::FileEventPublisher;

#[derive(Parser, Debug)]
#[command(name = "semforge", version, about = "Natural language to knowledge graph compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compiles one sentence into a structured document.
    Compile(CompileArgs),
    /// Shows context frames persisted by previous runs.
    Context {
        /// Context file written by `compile --context-file`.
        #[arg(long, default_value = "semforge-context.jsonl")]
        file: PathBuf,
        /// Number of frames to display.
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Sentence to compile.
    input: String,
    /// Output format: json, yaml, or xml. Anything else falls back to json.
    #[arg(long, default_value = "json")]
    format: String,
    /// Advisory language tag.
    #[arg(long, default_value = "en")]
    language: String,
    /// JSON-lines file carrying context frames across invocations.
    #[arg(long)]
    context_file: Option<PathBuf>,
    /// Writes the rendered document here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Appends structured pipeline logs to this JSON-lines file.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Appends progress events to this JSON-lines file.
    #[arg(long)]
    event_log: Option<PathBuf>,
    /// Prints the per-phase progress reports.
    #[arg(long)]
    show_phases: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Compile(args) => handle_compile(&args),
        Commands::Context { file, limit } => handle_context(&file, limit),
    }
}

fn handle_compile(args: &CompileArgs) -> Result<()> {
    let context = ContextMemory::default();
    if let Some(path) = &args.context_file {
        for frame in read_frames(path)? {
            context.push(frame);
        }
    }

    let mut compiler = Compiler::new(DefinitionResolver::offline()).with_context(context);
    if args.log_file.is_some() || args.event_log.is_some() {
        let mut builder = PipelineTelemetry::builder("semforge-cli");
        if let Some(path) = &args.log_file {
            builder = builder.log_path(path);
        }
        if let Some(path) = &args.event_log {
            builder = builder.event_publisher(Arc::new(FileEventPublisher::new(path)?));
        }
        compiler = compiler.with_telemetry(builder.build()?);
    }

    let request =
        CompileRequest::new(args.input.clone(), OutputFormat::parse(&args.format))
            .with_language(args.language.clone());

    let runtime = Runtime::new()?;
    let compilation = match runtime.block_on(compiler.compile(&request)) {
        Ok(compilation) => compilation,
        Err(err) => {
            for report in &err.phases {
                eprintln!(
                    "[{}] Phase {}: {} | {}",
                    report.status.label(),
                    report.phase,
                    report.name,
                    report.detail
                );
            }
            return Err(err.into());
        }
    };

    if args.show_phases {
        for report in &compilation.phases {
            println!(
                "[{}] Phase {}: {} | {}",
                report.status.label(),
                report.phase,
                report.name,
                report.detail
            );
        }
        println!(
            "Compiled in {}ms with {:.1}% confidence",
            compilation.elapsed_ms,
            compilation.confidence * 100.0
        );
    }

    if let Some(path) = &args.out {
        fs::write(path, &compilation.rendered)
            .with_context(|| format!("writing output to {}", path.display()))?;
    } else {
        println!("{}", compilation.rendered);
    }

    if let Some(path) = &args.context_file {
        if let Some(frame) = compiler.context().latest() {
            append_frame(path, &frame)?;
        }
    }

    Ok(())
}

fn handle_context(file: &Path, limit: usize) -> Result<()> {
    let frames = read_frames(file)?;
    if frames.is_empty() {
        println!("no context frames in {}", file.display());
        return Ok(());
    }
    let skip = frames.len().saturating_sub(limit);
    for frame in &frames[skip..] {
        println!(
            "{} | subject: {} | action: {}",
            frame.timestamp.to_rfc3339(),
            frame.subject.as_deref().unwrap_or("-"),
            frame.action.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn read_frames(path: &Path) -> Result<Vec<ContextFrame>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut frames = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: ContextFrame = serde_json::from_str(&line)
            .with_context(|| format!("parsing context frame from {}", path.display()))?;
        frames.push(frame);
    }
    Ok(frames)
}

fn append_frame(path: &Path, frame: &ContextFrame) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    serde_json::to_writer(&mut file, frame)?;
    file.write_all(b"\n")?;
    Ok(())
}
