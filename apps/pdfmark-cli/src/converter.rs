//! External document converter
//!
//! The converter rewrites the whole PDF, so any pattern injected before
//! conversion should be assumed gone afterwards. Its background listener is a
//! process we own for the duration of one conversion: [`ListenerGuard`] starts
//! it and tears it down on drop, whether the conversion succeeded or not.

use crate::config::ConverterConfig;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Running converter listener. Stopped when dropped.
pub struct ListenerGuard {
    child: Child,
    cleanup: Option<(String, Vec<String>)>,
}

impl ListenerGuard {
    /// Spawn the listener and wait for it to come up.
    pub fn start(config: &ConverterConfig) -> Result<Self> {
        tracing::info!(program = %config.program, "Starting converter listener");
        let child = Command::new(&config.program)
            .args(&config.listener_args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start listener `{}`", config.program))?;

        let guard = Self {
            child,
            cleanup: config
                .cleanup_program
                .clone()
                .map(|program| (program, config.cleanup_args.clone())),
        };
        std::thread::sleep(config.startup_delay());
        Ok(guard)
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            tracing::debug!("Listener already stopped: {}", e);
        }
        let _ = self.child.wait();

        if let Some((program, args)) = &self.cleanup {
            match Command::new(program)
                .args(args)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                Ok(status) => tracing::debug!(%status, "Ran listener cleanup"),
                Err(e) => tracing::warn!("Listener cleanup `{}` failed: {}", program, e),
            }
        }
    }
}

/// Drives one external conversion.
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Arguments for converting `input` into `output`, placeholders filled in.
    pub fn convert_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.display().to_string();
        let output = output.display().to_string();
        self.config
            .convert_args
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &output))
            .collect()
    }

    /// Convert `input` into `output` with the listener running.
    ///
    /// Both paths are made absolute first; the converter may run with a
    /// different working directory.
    #[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
    pub fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let input = absolute(input)?;
        let output = absolute(output)?;
        if !input.exists() {
            bail!("Input PDF not found: {}", input.display());
        }

        let _listener = ListenerGuard::start(&self.config)?;

        let args = self.convert_args(&input, &output);
        tracing::info!(program = %self.config.program, ?args, "Converting");
        let result = Command::new(&self.config.program)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to run `{}`", self.config.program))?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        let stderr = String::from_utf8_lossy(&result.stderr);
        if !stdout.trim().is_empty() {
            tracing::debug!("converter stdout: {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            tracing::debug!("converter stderr: {}", stderr.trim());
        }

        if !result.status.success() {
            bail!(
                "Converter exited with {}: {}",
                result.status,
                stderr.trim()
            );
        }
        // `output` may be a pre-created placeholder, so an empty file counts as missing
        let written = std::fs::metadata(&output).map(|m| m.len() > 0).unwrap_or(false);
        if !written {
            bail!("Output PDF not created at {}", output.display());
        }
        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display()))
}
