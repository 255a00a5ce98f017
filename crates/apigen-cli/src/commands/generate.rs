//! Generate command - run backends over a registry document.

use anyhow::{Context, Result, bail};
use apigen::input::parse_registry_str;
use apigen::{Artifact, BackendKind, GeneratorConfig, generate_all};
use clap::Args;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Generate command arguments
#[derive(Args)]
pub struct GenerateArgs {
    /// Registry JSON document, use - for stdin
    #[arg(short, long)]
    pub registry: PathBuf,

    /// Generator config (apigen.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Backend to run; repeat for several (all when omitted)
    #[arg(short, long = "backend", value_parser = parse_backend)]
    pub backends: Vec<BackendKind>,

    /// Directory to write artifacts into (stdout if not specified)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Extra blacklist file ({"functions": [...], "structures": [...]})
    #[arg(long)]
    pub blacklist: Option<PathBuf>,

    /// Consumer class name
    #[arg(long)]
    pub consumer_class: Option<String>,

    /// Decoder class name
    #[arg(long)]
    pub decoder_class: Option<String>,

    /// Declare consumer methods as overrides
    #[arg(long = "override")]
    pub is_override: bool,
}

fn parse_backend(name: &str) -> Result<BackendKind, String> {
    BackendKind::from_name(name).ok_or_else(|| {
        format!(
            "unknown backend `{name}`, expected one of: {}",
            apigen::backend_names().join(", ")
        )
    })
}

/// Run the generate command
pub fn run(args: GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(path) = &args.blacklist {
        config.merge_blacklist_file(path)?;
    }
    if let Some(name) = args.consumer_class {
        config.consumer.class_name = Some(name);
    }
    if let Some(name) = args.decoder_class {
        config.decoder.class_name = Some(name);
    }
    config.consumer.is_override |= args.is_override;

    let text = read_input(&args.registry)?;
    let registry = parse_registry_str(&text)
        .with_context(|| format!("Failed to parse registry {}", args.registry.display()))?;

    let kinds = if args.backends.is_empty() {
        BackendKind::ALL.to_vec()
    } else {
        args.backends
    };
    if args.out_dir.is_none() && kinds.len() > 1 {
        bail!("--out-dir is required when running more than one backend");
    }

    tracing::info!(
        registry = %args.registry.display(),
        backends = ?kinds.iter().map(|k| k.name()).collect::<Vec<_>>(),
        "generating"
    );
    let domain = config.domain(&registry);
    let backends = kinds.iter().map(|kind| kind.create(&config)).collect();
    // Nothing is written unless every backend succeeded.
    let artifacts = generate_all(&domain, backends, &config.output_options())
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .context("Generation failed")?;

    match &args.out_dir {
        Some(dir) => write_artifacts(dir, &artifacts),
        None => {
            for artifact in &artifacts {
                print!("{}", artifact.text);
            }
            Ok(())
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Stage every artifact in `dir`, then move them into place. On failure the
/// staged files are dropped and any already placed are removed again.
fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = dir.join(&artifact.file_name);
        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to stage {}", path.display()))?;
        file.write_all(artifact.text.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        staged.push((file, path));
    }

    let mut placed: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (file, path) in staged {
        if let Err(err) = file.persist(&path) {
            for done in &placed {
                let _ = std::fs::remove_file(done);
            }
            return Err(err).with_context(|| format!("Failed to write {}", path.display()));
        }
        placed.push(path);
    }
    for path in &placed {
        eprintln!("Generated {}", path.display());
    }
    Ok(())
}
