use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Parser, Subcommand};
use image::ImageFormat;
use sha2::{Digest, Sha256};
use studio_contracts::messages::{Locale, MessageKey};
use studio_contracts::references::{ReferenceSource, MAX_REFERENCES};
use studio_engine::{Clipboard, DocumentHost, ImageCount, Studio, StudioConfig};

#[derive(Debug, Parser)]
#[command(name = "image-studio", version, about = "Gemini image studio, headless host")]
struct Cli {
    /// Directory holding storage.json and saved results.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Append JSONL events to this file.
    #[arg(long, global = true)]
    events: Option<PathBuf>,
    #[arg(long, global = true)]
    api_base: Option<String>,
    #[arg(long, global = true)]
    model: Option<String>,
    /// Overrides the stored credential for this invocation only.
    #[arg(long, global = true)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Refs(RefsCommand),
    Prompt {
        text: Option<String>,
    },
    Key {
        value: String,
    },
    Locale {
        code: Option<String>,
    },
    Presets,
    Preset {
        id: String,
    },
    Generate(GenerateArgs),
    Usage,
    QuickLayer {
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum RefsCommand {
    List,
    Add {
        file: PathBuf,
        #[arg(long, default_value = "drop")]
        source: String,
    },
    Remove {
        id: String,
    },
    Clear,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    #[arg(long)]
    prompt: Option<String>,
    #[arg(long)]
    count: Option<String>,
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("image-studio error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = config_from_cli(&cli);
    let mut studio = Studio::open(config);
    let api_key = cli.api_key.as_deref();

    match cli.command {
        Command::Refs(command) => run_refs(&mut studio, command),
        Command::Prompt { text } => {
            match text {
                Some(text) => studio.set_prompt(&text)?,
                None => println!("{}", studio.settings().prompt()),
            }
            Ok(0)
        }
        Command::Key { value } => {
            let status = studio.set_credential(&value)?;
            println!("{}", status.label(studio.locale()));
            Ok(0)
        }
        Command::Locale { code } => {
            let Some(code) = code else {
                println!("{}", studio.locale().code());
                return Ok(0);
            };
            let Some(locale) = Locale::from_code(&code) else {
                let known: Vec<&str> = Locale::ALL.iter().map(|locale| locale.code()).collect();
                bail!("unknown locale {code:?} (expected one of {})", known.join(", "));
            };
            studio.set_locale(locale)?;
            Ok(0)
        }
        Command::Presets => {
            print_presets(&studio);
            Ok(0)
        }
        Command::Preset { id } => match studio.apply_preset(&id)? {
            Some(count) => {
                println!(
                    "{} ({} {})",
                    studio.locale().text(MessageKey::SuccessPrompt),
                    studio.locale().text(MessageKey::ImageCount),
                    count.get()
                );
                Ok(0)
            }
            None => bail!("unknown preset {id:?}"),
        },
        Command::Generate(args) => run_generate(&mut studio, api_key, args),
        Command::Usage => {
            let status = studio.refresh_usage(api_key);
            println!("{}", status.label(studio.locale()));
            Ok(if status.is_available() { 0 } else { 1 })
        }
        Command::QuickLayer { file } => {
            let mut host = FileHost::with_layer(file);
            let mut clipboard = StdoutClipboard;
            if !studio.quick_layer_to_clipboard(&mut host, &mut clipboard)? {
                return Ok(1);
            }
            eprintln!("{}", studio.locale().text(MessageKey::SuccessCopy));
            Ok(0)
        }
    }
}

fn config_from_cli(cli: &Cli) -> StudioConfig {
    let mut config = StudioConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(events) = &cli.events {
        config.events_path = Some(events.clone());
    }
    if let Some(base) = &cli.api_base {
        config.set_api_base(base);
    }
    if let Some(model) = cli.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        config.model = model.to_string();
    }
    config
}

fn run_refs(studio: &mut Studio, command: RefsCommand) -> Result<i32> {
    match command {
        RefsCommand::List => {
            if studio.references().is_empty() {
                println!("0/{MAX_REFERENCES}");
            }
            for reference in studio.references() {
                println!(
                    "{}\t{}\t{}",
                    reference.id,
                    reference.source.as_str(),
                    fingerprint(&reference.data)
                );
            }
            Ok(0)
        }
        RefsCommand::Add { file, source } => {
            let Some(source) = ReferenceSource::parse(&source) else {
                bail!("unknown reference source {source:?}");
            };
            let added = match source {
                ReferenceSource::Drop => studio.add_dropped(&png_from_file(&file)?)?,
                ReferenceSource::Document => {
                    studio.capture_document(&mut FileHost::with_document(file))?
                }
                ReferenceSource::Layer => studio.capture_layer(&mut FileHost::with_layer(file))?,
            };
            match added {
                Some(reference) => {
                    println!("{}", reference.id);
                    Ok(0)
                }
                None => Ok(1),
            }
        }
        RefsCommand::Remove { id } => Ok(if studio.remove_reference(&id)? { 0 } else { 1 }),
        RefsCommand::Clear => {
            studio.clear_references()?;
            Ok(0)
        }
    }
}

fn run_generate(studio: &mut Studio, api_key: Option<&str>, args: GenerateArgs) -> Result<i32> {
    if let Some(prompt) = &args.prompt {
        studio.set_prompt(prompt)?;
    }
    let count = ImageCount::parse(args.count.as_deref());
    let out_dir = args.out.unwrap_or_else(|| studio.config().results_dir());
    let locale = studio.locale();
    eprintln!("{}", locale.text(MessageKey::Loading));

    let ids: Vec<String> = match studio.generate(api_key, count) {
        Ok(results) => results.iter().map(|result| result.id.clone()).collect(),
        Err(err) => {
            eprintln!("{}", studio.notice_for(&err));
            return Ok(1);
        }
    };
    println!("{}: {}", locale.text(MessageKey::Results), ids.len());
    for id in &ids {
        if let Some(path) = studio.save_result(id, &out_dir)? {
            println!("{}", path.display());
        }
    }
    Ok(0)
}

fn print_presets(studio: &Studio) {
    let locale = studio.locale();
    for category in studio.presets().categories() {
        println!("{} {}", category.icon, category.name.get(locale));
        for item in &category.items {
            println!("  {}\t[{}]\t{}", item.id, item.count, item.prompt);
        }
    }
    println!("{}", locale.text(MessageKey::QuickPresets));
    for preset in studio.presets().quick_presets() {
        let label = preset
            .name
            .as_ref()
            .map(|name| name.get(locale))
            .unwrap_or(preset.prompt);
        println!("  {}\t[{}]\t{}", preset.id, preset.count, label);
    }
}

/// Short content hash of a stored base64 image.
fn fingerprint(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(&hasher.finalize()[..6])
}

/// Re-encodes any readable image file as PNG.
fn png_from_file(path: &Path) -> Result<Vec<u8>> {
    let image = image::open(path)
        .with_context(|| format!("failed to read image ({})", path.display()))?;
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .with_context(|| format!("failed to encode PNG for {}", path.display()))?;
    Ok(bytes.into_inner())
}

/// Files on disk standing in for the open document and its active layer.
/// Placed images land next to the layer file.
#[derive(Debug, Default)]
struct FileHost {
    document: Option<PathBuf>,
    layer: Option<PathBuf>,
}

impl FileHost {
    fn with_document(path: PathBuf) -> Self {
        Self {
            document: Some(path),
            layer: None,
        }
    }

    fn with_layer(path: PathBuf) -> Self {
        Self {
            document: None,
            layer: Some(path),
        }
    }

    fn export(path: Option<&Path>) -> Result<Option<Vec<u8>>> {
        match path {
            Some(path) if path.is_file() => png_from_file(path).map(Some),
            Some(path) => {
                log::warn!("no image at {}", path.display());
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

impl DocumentHost for FileHost {
    fn export_document(&mut self) -> Result<Option<Vec<u8>>> {
        Self::export(self.document.as_deref())
    }

    fn export_active_layer(&mut self) -> Result<Option<Vec<u8>>> {
        Self::export(self.layer.as_deref())
    }

    fn place_image(&mut self, image: &[u8]) -> Result<()> {
        let anchor = self.layer.as_deref().or(self.document.as_deref());
        let dir = anchor
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let path = dir.join(format!("placed-{}.png", fingerprint(&BASE64.encode(image))));
        fs::write(&path, image).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use studio_engine::DocumentHost;

    use super::{fingerprint, png_from_file, FileHost};

    #[test]
    fn file_host_reencodes_as_png() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let source = temp.path().join("layer.bmp");
        RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255])).save(&source)?;

        let mut host = FileHost::with_layer(source.clone());
        let exported = host.export_active_layer()?.unwrap_or_default();
        assert!(exported.starts_with(b"\x89PNG"));
        assert_eq!(exported, png_from_file(&source)?);
        assert_eq!(host.export_document()?, None);

        host.place_image(&exported)?;
        let placed = temp
            .path()
            .join(format!("placed-{}.png", fingerprint(&base64_of(&exported))));
        assert!(placed.is_file());
        Ok(())
    }

    #[test]
    fn missing_layer_file_exports_nothing() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut host = FileHost::with_layer(temp.path().join("absent.png"));
        assert_eq!(host.export_active_layer()?, None);
        Ok(())
    }

    #[test]
    fn fingerprint_is_short_hex() {
        let value = fingerprint("aGVsbG8=");
        assert_eq!(value.len(), 12);
        assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(value, fingerprint("aGVsbG8="));
    }

    fn base64_of(bytes: &[u8]) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }
}
