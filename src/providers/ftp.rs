use crate::config::FtpConfig;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use suppaftp::FtpStream;
use tracing::{error, info};

const REMOTE_DIR: &str = "as-a-treat";

/// Uploads the rotation files and log to the FTP host.
pub struct FtpUploader {
    config: FtpConfig,
}

impl FtpUploader {
    pub fn new(config: FtpConfig) -> Self {
        Self { config }
    }

    /// Upload one file. A missing local file is logged and skipped.
    pub fn upload(&self, filename: &str) -> Result<()> {
        if !Path::new(filename).is_file() {
            error!("File {filename} does not exist");
            return Ok(());
        }

        let mut session = FtpStream::connect(format!("{}:21", self.config.host))
            .with_context(|| format!("connect to FTP host {}", self.config.host))?;
        session
            .login(&self.config.user, &self.config.pass)
            .context("FTP login")?;
        session.cwd(REMOTE_DIR).context("FTP cwd")?;

        let mut file = File::open(filename)?;
        session
            .put_file(filename, &mut file)
            .with_context(|| format!("FTP upload of {filename}"))?;
        session.quit().context("FTP quit")?;

        info!("Uploaded {filename}");
        Ok(())
    }
}
