//! imgvault 命令行入口
//!
//! 用法：
//!   imgvault encrypt <input_dir> <output_dir>
//!   imgvault decrypt <input_dir> [--export <dir>]
//!
//! 密钥来源（按优先级）：`--key` / `IMGVAULT_KEY`，否则无回显交互输入。
//! 所有实际逻辑都委托给库。

use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use zeroize::Zeroizing;

use imgvault::fs::atomic::write_atomic;
use imgvault::{DecryptionReport, EncryptionReport, Key, PlaintextRecord, VaultError};

const MAX_KEY_PROMPTS: usize = 3;

#[derive(Parser, Debug)]
#[command(
    name = "imgvault",
    version,
    about = "Encrypt a folder of images, or decrypt it back in display order"
)]
struct Cli {
    /// Encryption key, used as-is (16, 24 or 32 bytes). Prompted if absent.
    #[arg(long, env = "IMGVAULT_KEY", hide_env_values = true, global = true)]
    key: Option<String>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt every image in INPUT into OUTPUT as `<name>.enc`
    Encrypt {
        input: PathBuf,
        output: PathBuf,
    },

    /// Decrypt every `.enc` file in INPUT and list them in display order
    Decrypt {
        input: PathBuf,
        /// Write each decrypted image to this directory under its original name
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// 返回值表示是否所有文件都处理成功。
fn run(cli: Cli) -> Result<bool> {
    let key = resolve_key(cli.key.map(Zeroizing::new))?;

    match cli.command {
        Commands::Encrypt { input, output } => {
            let report = imgvault::encrypt_folder(&key, &input, &output)
                .with_context(|| format!("encrypting {}", input.display()))?;
            print_encryption_summary(&report);
            Ok(report.is_complete())
        }
        Commands::Decrypt { input, export } => {
            let report = imgvault::decrypt_folder(&key, &input)
                .with_context(|| format!("decrypting {}", input.display()))?;
            print_decryption_summary(&report);

            let exported = match export {
                Some(dir) => export_records(&report, &dir)?,
                None => true,
            };
            Ok(report.is_complete() && exported)
        }
    }
}

/// 显式给出的密钥长度不对直接报错；交互输入则最多重试三次。
fn resolve_key(supplied: Option<Zeroizing<String>>) -> Result<Key> {
    if let Some(raw) = supplied {
        return imgvault::validate_key(raw.as_bytes()).context("invalid --key / IMGVAULT_KEY");
    }

    for _ in 0..MAX_KEY_PROMPTS {
        let raw = Zeroizing::new(
            rpassword::prompt_password("Enter key (16, 24, or 32 bytes): ")
                .context("reading key from terminal")?,
        );

        match imgvault::validate_key(raw.as_bytes()) {
            Ok(key) => return Ok(key),
            Err(e @ VaultError::InvalidKeyLength { .. }) => eprintln!("{e}"),
            Err(e) => return Err(e.into()),
        }
    }

    bail!("no valid key after {MAX_KEY_PROMPTS} attempts")
}

fn print_encryption_summary(report: &EncryptionReport) {
    for file in &report.encrypted {
        println!(
            "Encrypted {} -> {}",
            file.source.display(),
            file.destination.display()
        );
    }
    for failure in &report.failures {
        eprintln!("Failed {failure}");
    }
    println!(
        "{} encrypted, {} failed, {} skipped{}",
        report.encrypted.len(),
        report.failures.len(),
        report.skipped,
        if report.cancelled { " (cancelled)" } else { "" }
    );
}

fn print_decryption_summary(report: &DecryptionReport) {
    for (i, record) in report.records.iter().enumerate() {
        println!("{:>4}  {}  ({} bytes)", i + 1, record.name, record.bytes.len());
    }
    for failure in &report.failures {
        eprintln!("Failed {failure}");
    }
    println!(
        "{} decrypted, {} failed{}",
        report.records.len(),
        report.failures.len(),
        if report.cancelled { " (cancelled)" } else { "" }
    );
}

/// 逐个导出明文，单个文件失败不影响其余文件。
///
/// 返回值表示是否全部导出成功。
fn export_records(report: &DecryptionReport, dir: &Path) -> Result<bool> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut claimed = HashSet::new();
    let mut exported = 0usize;
    let mut failed = 0usize;

    for record in &report.records {
        match export_record(record, dir, &mut claimed) {
            Ok(target) => {
                exported += 1;
                tracing::info!(path = %target.display(), "exported image");
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(name = %record.name, error = %format!("{e:#}"), "failed to export image");
                eprintln!("Failed export {}: {e:#}", record.name);
            }
        }
    }

    println!("{exported} exported, {failed} failed");
    Ok(failed == 0)
}

fn export_record(
    record: &PlaintextRecord,
    dir: &Path,
    claimed: &mut HashSet<String>,
) -> Result<PathBuf> {
    let name = record.original_name();

    // x.png.enc 与 x.png.ENC 会得到同一个导出名；大小写不敏感的文件系统上 X.PNG 也算
    if !claimed.insert(name.to_lowercase()) {
        bail!("duplicate export name {name:?}, already taken by an earlier file");
    }

    let target = export_path(dir, name)?;
    write_atomic(&target, |file| {
        let mut writer = BufWriter::new(file);
        writer.write_all(&record.bytes)?;
        writer.flush()
    })
    .with_context(|| format!("exporting {}", target.display()))?;

    Ok(target)
}

/// 原始文件名只能是单个普通路径组件，防止写出到导出目录之外。
fn export_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => Ok(dir.join(part)),
        _ => bail!("refusing to export unsafe file name {name:?}"),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // 日志写 stderr，stdout 只输出结果
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
