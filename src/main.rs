//! Command-line interface for xsd-classmodel

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xsd_classmodel::indexes::{
    ComplexRefList, DisambiguationTable, ExternalIndexes, GeneralizationTable, SubtypeIndex,
};
#[cfg(feature = "cli")]
use xsd_classmodel::loaders::Loader;
#[cfg(feature = "cli")]
use xsd_classmodel::{ClassModel, Compiler, CompilerConfig, Location};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsd-classmodel")]
#[command(author, version, about = "Compile an XML Schema into a class model", long_about = None)]
struct Cli {
    /// Log compilation stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args, Debug)]
struct Inputs {
    /// Path to the XSD schema file
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,

    /// Compiler configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subtype index (group -> complex types)
    #[arg(long)]
    subtype_index: Option<PathBuf>,

    /// Indirection types that get no lookup accessors
    #[arg(long)]
    complex_refs: Option<PathBuf>,

    /// Tag disambiguation table
    #[arg(long)]
    tag_table: Option<PathBuf>,

    /// Generalization table
    #[arg(long)]
    generalizations: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a schema and write the class model as JSON
    Compile {
        #[command(flatten)]
        inputs: Inputs,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a schema and display a summary of the model
    Inspect {
        #[command(flatten)]
        inputs: Inputs,

        /// List every class with its attribute count
        #[arg(long)]
        classes: bool,

        /// List every group
        #[arg(long)]
        groups: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            inputs,
            pretty,
            output,
        } => cmd_compile(&inputs, pretty, output),
        Commands::Inspect {
            inputs,
            classes,
            groups,
        } => cmd_inspect(&inputs, classes, groups),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn load_indexes(inputs: &Inputs, loader: &Loader) -> xsd_classmodel::Result<ExternalIndexes> {
    let mut indexes = ExternalIndexes::new();

    if let Some(path) = &inputs.subtype_index {
        indexes = indexes.with_subtypes(SubtypeIndex::load(loader, &Location::from(path.as_path()))?);
    }
    if let Some(path) = &inputs.complex_refs {
        indexes = indexes.with_complex_refs(ComplexRefList::load(loader, &Location::from(path.as_path()))?);
    }
    if let Some(path) = &inputs.tag_table {
        indexes = indexes.with_tags(DisambiguationTable::load(loader, &Location::from(path.as_path()))?);
    }
    if let Some(path) = &inputs.generalizations {
        indexes = indexes.with_generalizations(GeneralizationTable::load(loader, &Location::from(path.as_path()))?);
    }
    Ok(indexes)
}

#[cfg(feature = "cli")]
fn compile(inputs: &Inputs) -> xsd_classmodel::Result<ClassModel> {
    let config = match &inputs.config {
        Some(path) => CompilerConfig::from_file(path)?,
        None => CompilerConfig::default(),
    };
    let indexes = load_indexes(inputs, &Loader::new())?;

    Compiler::new()
        .with_config(config)
        .with_indexes(indexes)
        .compile_location(&Location::from(inputs.schema.clone()))
}

#[cfg(feature = "cli")]
fn cmd_compile(
    inputs: &Inputs,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = compile(inputs)?;
    let json = if pretty {
        model.to_json_pretty()?
    } else {
        serde_json::to_string(&model)?
    };

    match output {
        Some(path) => {
            fs::write(&path, json)?;
            eprintln!("Wrote class model to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(
    inputs: &Inputs,
    show_classes: bool,
    show_groups: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = compile(inputs)?;

    println!("xsd-classmodel v{}", xsd_classmodel::VERSION);
    println!("Schema: {}", inputs.schema.display());
    println!("Groups: {}", model.groups.len());
    println!("Classes: {}", model.classes.len());
    println!("Inner classes: {}", model.emitted_inner_classes().len());
    println!("Simple types: {}", model.simple_types.len());
    println!("Wrappers: {}", model.wrappers.len());
    println!("Warnings: {}", model.warnings.len());

    if show_groups {
        println!("\n=== Groups ===");
        for group in model.groups.values() {
            let marker = if group.mixed { " (mixed)" } else { "" };
            println!("  {} -> {}{}", group.name, group.class_name, marker);
        }
    }

    if show_classes {
        println!("\n=== Classes ===");
        for class in model.classes.values() {
            let base = class
                .base_class
                .as_ref()
                .map(|b| format!(" extends {}", b))
                .unwrap_or_default();
            println!(
                "  {}{} : {} attributes",
                class.name,
                base,
                class.attributes.len()
            );
        }
    }

    for warning in &model.warnings {
        println!("warning: {}", warning);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
