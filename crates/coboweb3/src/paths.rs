use directories::ProjectDirs;
use eyre::ContextCompat as _;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PortalPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
}

impl PortalPaths {
    pub fn discover() -> eyre::Result<Self> {
        // Test/CI override knobs.
        if let (Ok(data_dir), Ok(config_dir)) = (
            std::env::var("COBOWEB3_DATA_DIR"),
            std::env::var("COBOWEB3_CONFIG_DIR"),
        ) {
            let data_dir = PathBuf::from(data_dir);
            let config_dir = PathBuf::from(config_dir);
            let log_file = data_dir.join("coboweb3.log.jsonl");
            return Ok(Self {
                config_dir,
                data_dir,
                log_file,
            });
        }

        // macOS: ~/Library/Application Support/coboweb3
        // Linux: ~/.config/coboweb3
        // Windows: %APPDATA%\\coboweb3
        let proj =
            ProjectDirs::from("", "", "coboweb3").context("failed to resolve project dirs")?;
        let config_dir = proj.config_dir().to_path_buf();
        let data_dir = proj.data_dir().to_path_buf();
        let log_file = data_dir.join("coboweb3.log.jsonl");

        Ok(Self {
            config_dir,
            data_dir,
            log_file,
        })
    }
}
