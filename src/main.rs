use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upload_persister::config::Config;
use upload_persister::persist::{TempUploadPersister, UploadPersister};
use upload_persister::sanitize;
use upload_persister::upload::{FileUpload, Upload};

#[derive(Debug, Parser)]
#[command(name = "upload-persister")]
#[command(about = "Copy files into the upload temp directory and print their new paths")]
struct CliArgs {
    /// Files to persist.
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Overrides UPLOAD_TEMP_DIR.
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Print a JSON report instead of one path per line.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct PersistedUpload {
    source: PathBuf,
    sanitized_name: String,
    path: PathBuf,
    bytes: u64,
}

fn release_or_log(persister: &TempUploadPersister, path: &Path) {
    if let Err(e) = persister.release(path) {
        error!("Failed to release {}: {}", path.display(), e);
    }
}

fn report(
    persister: &TempUploadPersister,
    source: &Path,
    sanitized_name: String,
    path: PathBuf,
) -> Result<PersistedUpload> {
    let bytes = match std::fs::metadata(&path) {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            release_or_log(persister, &path);
            return Err(anyhow::Error::new(e).context(format!("Cannot stat {}", path.display())));
        }
    };

    Ok(PersistedUpload {
        source: source.to_path_buf(),
        sanitized_name,
        path,
        bytes,
    })
}

async fn persist_one(persister: &TempUploadPersister, source: &Path) -> Result<PersistedUpload> {
    let mut upload = FileUpload::new(source);
    let sanitized_name = sanitize::base_name(upload.filename().unwrap_or_default());

    let path = persister.persist(&mut upload).await?;
    report(persister, source, sanitized_name, path)
}

async fn persist_all(
    persister: &TempUploadPersister,
    files: &[PathBuf],
) -> Result<Vec<PersistedUpload>> {
    let mut persisted: Vec<PersistedUpload> = Vec::with_capacity(files.len());

    for source in files {
        match persist_one(persister, source).await {
            Ok(upload) => persisted.push(upload),
            Err(e) => {
                // All or nothing: drop what this run already wrote.
                for done in &persisted {
                    release_or_log(persister, &done.path);
                }
                return Err(e);
            }
        }
    }

    Ok(persisted)
}

fn render(persisted: &[PersistedUpload], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(persisted)?);
    }

    Ok(persisted
        .iter()
        .map(|p| p.path.display().to_string())
        .collect::<Vec<_>>()
        .join("\n"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_persister=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(temp_dir) = args.temp_dir {
        config.temp_dir = temp_dir;
    }

    let persister = match TempUploadPersister::new(&config) {
        Ok(persister) => persister,
        Err(e) => {
            error!("Failed to initialize persister: {}", e);
            std::process::exit(1);
        }
    };
    info!("Persisting into {}", persister.temp_dir().display());

    match persist_all(&persister, &args.files).await {
        Ok(persisted) => {
            println!("{}", render(&persisted, args.json)?);
            info!("Persisted {} file(s)", persisted.len());
            Ok(())
        }
        Err(e) => {
            error!("Persisting failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_source(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_cli_requires_files() {
        assert!(CliArgs::try_parse_from(["upload-persister"]).is_err());

        let args =
            CliArgs::try_parse_from(["upload-persister", "--json", "--temp-dir", "/x", "a.txt"])
                .unwrap();
        assert!(args.json);
        assert_eq!(args.temp_dir, Some(PathBuf::from("/x")));
        assert_eq!(args.files, vec![PathBuf::from("a.txt")]);
    }

    #[tokio::test]
    async fn test_persist_all_reports_each_file() {
        let sources = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let persister = TempUploadPersister::new(&Config::with_temp_dir(target.path())).unwrap();
        let files = vec![
            write_source(&sources, "one.txt", b"first"),
            write_source(&sources, "two.txt", b""),
        ];

        let persisted = persist_all(&persister, &files).await.unwrap();

        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0].sanitized_name, "one.txt");
        assert_eq!(persisted[0].bytes, 5);
        assert_eq!(persisted[1].bytes, 0);
        assert_eq!(std::fs::read(&persisted[0].path).unwrap(), b"first");

        let json = render(&persisted, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["sanitized_name"], "one.txt");

        let plain = render(&persisted, false).unwrap();
        assert_eq!(plain.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_persist_all_rolls_back_on_failure() {
        let sources = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let persister = TempUploadPersister::new(&Config::with_temp_dir(target.path())).unwrap();
        let files = vec![
            write_source(&sources, "ok.txt", b"fine"),
            sources.path().join("missing.txt"),
        ];

        let err = persist_all(&persister, &files).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<upload_persister::Error>(),
            Some(upload_persister::Error::Read(_))
        ));
        assert_eq!(std::fs::read_dir(persister.temp_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_report_fails_when_file_is_gone() {
        let target = TempDir::new().unwrap();
        let persister = TempUploadPersister::new(&Config::with_temp_dir(target.path())).unwrap();
        let vanished = persister.temp_dir().join("tmpgone_a.txt");

        let err = report(
            &persister,
            Path::new("a.txt"),
            "a.txt".to_string(),
            vanished.clone(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("Cannot stat"));
        assert!(!vanished.exists());
    }
}
