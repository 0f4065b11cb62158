use chrono::Local;
use clap::Parser;
use directories::ProjectDirs;
use formgrid::api::{FieldOp, FieldsApi, GridMessage, GridResult, TableApi};
use formgrid::collection::AddPolicy;
use formgrid::compose::{compose_with, TokenPosition};
use formgrid::config::{GridConfig, KEYS};
use formgrid::error::{GridError, Result};
use formgrid::export::{ExportFormat, FsSink};
use formgrid::field::RawDescriptor;
use formgrid::sequence::SequenceKind;
use formgrid::table::Row;
use formgrid::variant::{CheckboxGroup, FieldVariant, RadioGroup, SingleSelect, TextInput, VariantKind};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

mod args;
mod cli;
use args::{Cli, Commands};
use cli::print::{print_deleted, print_fields, print_host_patch, print_messages, print_table};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    config: GridConfig,
    config_dir: PathBuf,
    json: bool,
}

/// Shape of the file passed to `formgrid fields`.
#[derive(Debug, Deserialize)]
struct FieldsFile {
    #[serde(default)]
    policy: AddPolicy,
    fields: Vec<RawDescriptor>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Commands::Table {
            rows,
            search,
            sort,
            page,
            page_size,
            no_paginate,
            export,
            out,
        } => handle_table(
            &ctx,
            &rows,
            TableArgs {
                search,
                sort,
                page,
                page_size,
                no_paginate,
                export,
                out,
            },
        ),
        Commands::Fields {
            fields,
            variant,
            add,
            delete,
            set,
        } => handle_fields(&ctx, &fields, &variant, add, &delete, &set),
        Commands::Label {
            kind,
            index,
            base,
            prefix,
            suffix,
        } => handle_label(&ctx, &kind, index, &base, prefix, suffix),
        Commands::Config { key, value } => handle_config(&mut ctx, key, value),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let config_dir = match std::env::var_os("FORMGRID_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => ProjectDirs::from("com", "formgrid", "formgrid")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| GridError::Config("Could not determine config dir".into()))?,
    };
    debug!("config dir: {}", config_dir.display());
    let config = GridConfig::load(&config_dir)?;

    Ok(AppContext {
        config,
        config_dir,
        json: cli.json,
    })
}

struct TableArgs {
    search: Option<String>,
    sort: Vec<String>,
    page: usize,
    page_size: Option<usize>,
    no_paginate: bool,
    export: Option<String>,
    out: Option<String>,
}

fn handle_table(ctx: &AppContext, path: &Path, args: TableArgs) -> Result<()> {
    let rows: Vec<Row> = serde_json::from_str(&fs::read_to_string(path)?)?;
    let format = args
        .export
        .as_deref()
        .map(str::parse::<ExportFormat>)
        .transpose()?;

    let cwd = std::env::current_dir()?;
    let mut api = TableApi::new(rows, ctx.config.clone(), FsSink::new(cwd))?;
    let mut messages: Vec<GridMessage> = Vec::new();

    if let Some(size) = args.page_size {
        api.set_page_size(size)?;
    }
    if args.no_paginate {
        api.set_paginate(false);
    }
    if let Some(query) = &args.search {
        api.search(query);
    }
    for key in &args.sort {
        messages.extend(api.sort(key).messages);
    }
    let mut result = api.go_to_page(args.page.saturating_sub(1));

    if let Some(format) = format {
        let name = args.out.unwrap_or_else(|| default_export_name(&ctx.config));
        let exported = api.export(format, Some(&name));
        messages.extend(exported.messages);
        for text in &api.sink().printed {
            println!("{}", text);
        }
    }
    messages.append(&mut result.messages);
    result.messages = messages;

    render(ctx, &result, |result| {
        if let Some(page) = &result.table {
            print_table(page);
        }
    })
}

fn default_export_name(config: &GridConfig) -> String {
    format!(
        "{}-{}",
        config.file_name,
        Local::now().format("%Y-%m-%d_%H-%M-%S")
    )
}

fn handle_fields(
    ctx: &AppContext,
    path: &Path,
    variant: &str,
    add: usize,
    delete: &[usize],
    set: &[String],
) -> Result<()> {
    let file: FieldsFile = serde_json::from_str(&fs::read_to_string(path)?)?;
    if file.policy.enabled {
        file.policy.validate()?;
    }

    let mut ops = Vec::new();
    for assignment in set {
        ops.push(format!("set:{}", assignment).parse::<FieldOp>()?);
    }
    ops.extend(std::iter::repeat_n(FieldOp::Add, add));
    ops.extend(delete.iter().map(|&i| FieldOp::Delete(i)));

    let kind: VariantKind = variant.parse().map_err(GridError::Api)?;
    let result = match kind {
        VariantKind::Text => replay::<TextInput>(ctx, file, &ops)?,
        VariantKind::Select => replay::<SingleSelect>(ctx, file, &ops)?,
        VariantKind::Radio => replay::<RadioGroup>(ctx, file, &ops)?,
        VariantKind::Checkbox => replay::<CheckboxGroup>(ctx, file, &ops)?,
    };

    render(ctx, &result, |result| {
        print_fields(&result.fields);
        print_host_patch(&result.host_patch);
        print_deleted(&result.deleted);
    })
}

/// Applies `ops` in order, folding patches, deletions and messages into one result.
fn replay<V: FieldVariant>(ctx: &AppContext, file: FieldsFile, ops: &[FieldOp]) -> Result<GridResult> {
    debug!("replaying {} operations on {} fields", ops.len(), V::NAME);
    let mut api: FieldsApi<V> = FieldsApi::new(file.fields, file.policy, &ctx.config)?;
    let mut combined = api.current();
    for op in ops {
        let mut step = api.apply(op)?;
        combined.host_patch.append(&mut step.host_patch);
        combined.deleted.append(&mut step.deleted);
        combined.messages.append(&mut step.messages);
        combined.fields = step.fields;
    }
    Ok(combined)
}

fn handle_label(
    ctx: &AppContext,
    kind: &str,
    index: usize,
    base: &str,
    prefix: bool,
    suffix: bool,
) -> Result<()> {
    let kind: SequenceKind = kind.parse().unwrap_or(SequenceKind::Disabled);
    let alphabet = ctx.config.alphabet()?;
    let label = compose_with(base, index, kind, TokenPosition::from_flags(prefix, suffix), &alphabet);
    if ctx.json {
        println!("{}", serde_json::to_string(&label)?);
    } else {
        println!("{}", label);
    }
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key, value) {
        (None, _) => {
            for key in KEYS {
                println!("{} = {}", key, ctx.config.get(key)?);
            }
        }
        (Some(key), None) => println!("{} = {}", key, ctx.config.get(&key)?),
        (Some(key), Some(value)) => {
            ctx.config.set(&key, &value)?;
            ctx.config.save(&ctx.config_dir)?;
            print_messages(&[GridMessage::success(format!("{} = {}", key, value))]);
        }
    }
    Ok(())
}

fn render(ctx: &AppContext, result: &GridResult, print: impl Fn(&GridResult)) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print(result);
        print_messages(&result.messages);
    }
    Ok(())
}
