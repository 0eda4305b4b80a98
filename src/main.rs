//! adaptive-stego - Adaptive image steganography.
//!
//! Hides encrypted data in the low bits of PNG/BMP images and scores images
//! for signs of hidden data.

use adaptive_stego::carrier::io as image_io;
use adaptive_stego::{Secret, Stego, StegoConfig};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the detect command picks up when walking a directory.
const IMAGE_EXTENSIONS: &[&str] = &["png", "bmp"];

#[derive(Parser)]
#[command(name = "adaptive-stego")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Adaptive image steganography with edge-aware capacity",
    long_about = "Hides AES-256-GCM encrypted data in textured regions of lossless images, with keyed bit ordering, triple redundancy and a key-less steganalysis detector."
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a secret in a cover image
    Embed {
        /// Cover image (PNG or BMP)
        cover: PathBuf,

        /// Output image; use .png or .bmp
        output: PathBuf,

        /// Secret file to hide
        #[arg(long, conflicts_with = "text")]
        input: Option<PathBuf>,

        /// Secret text to hide
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,
    },

    /// Recover a secret from a stego image
    Extract {
        /// Stego image
        image: PathBuf,

        /// Output file (default: stdout; `--json` then reports on stderr)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Score images for hidden data
    Detect {
        /// Image file or directory to scan
        path: PathBuf,
    },

    /// Show how much an image can carry
    Capacity {
        /// Cover image
        image: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => StegoConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StegoConfig::default(),
    };
    let stego = Stego::new(config)?;

    match cli.command {
        Commands::Embed {
            cover,
            output,
            input,
            text,
        } => cmd_embed(&stego, &cover, &output, input, text, cli.json),

        Commands::Extract { image, output } => cmd_extract(&stego, &image, output, cli.json),

        Commands::Detect { path } => cmd_detect(&stego, &path, cli.json),

        Commands::Capacity { image } => cmd_capacity(&stego, &image, cli.json),
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Ok(password),
        Err(_) => {
            // No terminal: fall back to a plain line on stdin
            eprint!("{}", prompt);
            io::stderr().flush()?;
            let mut password = String::new();
            io::stdin().read_line(&mut password)?;
            Ok(password.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_image(path: &Path) -> Result<adaptive_stego::PixelGrid> {
    image_io::load(path).with_context(|| format!("reading image {}", path.display()))
}

fn cmd_embed(
    stego: &Stego,
    cover_path: &Path,
    output: &Path,
    input: Option<PathBuf>,
    text: Option<String>,
    json: bool,
) -> Result<()> {
    let secret = match (input, text) {
        (Some(path), None) => {
            let data = std::fs::read(&path)
                .with_context(|| format!("reading secret {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            Secret::new(data, name)
        }
        (None, Some(text)) => {
            if text.trim().is_empty() {
                bail!("secret text is empty");
            }
            Secret::text(&text)
        }
        (None, None) => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Secret::new(buffer, None)
        }
        (Some(_), Some(_)) => bail!("--input and --text are mutually exclusive"),
    };

    let cover = load_image(cover_path)?;
    let password = prompt_password("Passphrase: ")?;
    let confirm = prompt_password("Confirm passphrase: ")?;
    if password != confirm {
        bail!("passphrases do not match");
    }

    let embedded = stego.embed(&cover, &secret, &password)?;
    image_io::save(&embedded.image, output)
        .with_context(|| format!("writing image {}", output.display()))?;

    if json {
        return print_json(&embedded.metrics);
    }

    let m = &embedded.metrics;
    println!("Embedded {} bytes into {}", secret.data.len(), output.display());
    println!("  Frame size:     {} bytes", m.used_bytes);
    println!("  Capacity:       {} bytes ({:.1}% used)", m.capacity_bytes, m.utilization());
    println!("  MSE:            {:.6}", m.mse);
    if m.psnr.is_finite() {
        println!("  PSNR:           {:.2} dB", m.psnr);
    } else {
        println!("  PSNR:           inf");
    }

    Ok(())
}

/// Where the extract report goes. Without `--output` the payload owns
/// stdout, so a JSON report moves to stderr and the text report is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportSink {
    Stdout,
    Stderr,
    Quiet,
}

fn extract_report_sink(to_file: bool, json: bool) -> ReportSink {
    match (to_file, json) {
        (true, _) => ReportSink::Stdout,
        (false, true) => ReportSink::Stderr,
        (false, false) => ReportSink::Quiet,
    }
}

fn cmd_extract(stego: &Stego, image: &Path, output: Option<PathBuf>, json: bool) -> Result<()> {
    let grid = load_image(image)?;
    let password = prompt_password("Passphrase: ")?;
    let extracted = stego.extract(&grid, &password)?;

    match &output {
        Some(path) => std::fs::write(path, &extracted.data)
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&extracted.data)?;
            stdout.flush()?;
        }
    }

    match extract_report_sink(output.is_some(), json) {
        ReportSink::Stdout if json => print_json(&extracted)?,
        ReportSink::Stdout => {
            if let Some(path) = &output {
                println!("Wrote {} bytes to {}", extracted.data.len(), path.display());
            }
            if let Some(name) = &extracted.filename {
                println!("  Original name:  {}", name);
            }
            println!("  SHA-256:        {}", extracted.sha256);
            println!("  Verified:       {}", extracted.verified);
            if extracted.corrected_bits > 0 {
                println!("  Repaired bits:  {}", extracted.corrected_bits);
            }
        }
        ReportSink::Stderr => eprintln!("{}", serde_json::to_string_pretty(&extracted)?),
        ReportSink::Quiet => {}
    }

    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Serialize)]
struct DetectLine {
    path: PathBuf,
    #[serde(flatten)]
    detection: adaptive_stego::Detection,
}

fn cmd_detect(stego: &Stego, path: &Path, json: bool) -> Result<()> {
    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_image(e.path()))
            .map(|e| e.into_path())
            .collect()
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        bail!("no PNG or BMP images under {}", path.display());
    }

    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let grid = load_image(&file)?;
        let detection = stego.detect(&grid);
        results.push(DetectLine {
            path: file,
            detection,
        });
    }

    if json {
        return print_json(&results);
    }

    for line in &results {
        println!(
            "{:<13} {:.3}  {}",
            line.detection.verdict.to_string(),
            line.detection.score,
            line.path.display()
        );
    }

    Ok(())
}

fn cmd_capacity(stego: &Stego, image: &Path, json: bool) -> Result<()> {
    let grid = load_image(image)?;
    let report = stego.capacity(&grid)?;

    if json {
        return print_json(&report);
    }

    println!("Capacity Report");
    println!("===============");
    println!("Image:            {}x{}", report.width, report.height);
    println!();
    println!("Pixels by depth:");
    println!("  Smooth (0 bits):   {}", report.bands.smooth);
    println!("  Textured (1 bit):  {}", report.bands.textured);
    println!("  Edge (2 bits):     {}", report.bands.edge);
    println!();
    println!("Raw slots:        {} bits", report.raw_bits);
    println!("Frame capacity:   {} bytes", report.capacity_bytes);
    println!("Max secret:       {} bytes", report.max_secret_len);

    Ok(())
}
