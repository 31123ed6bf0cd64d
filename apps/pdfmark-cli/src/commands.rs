use crate::config::Config;
use crate::converter::Converter;
use crate::report::{
    injection_text, pattern_dump, structure_text, verification_text, CommandOutput,
    PatternOutput,
};
use anyhow::{Context, Result};
use pdfmark_core::{
    analyze, find_in_streams, inject_pattern_into_pdf, verify_file, InjectOptions,
    InjectionReport, Pattern, Payload, PdfDocument, StructureReport, VerificationReport,
};
use serde::Serialize;
use std::path::Path;
use tempfile::TempPath;

/// Settings shared by every command after config and flags are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: Config,
    pub json: bool,
}

impl Settings {
    pub fn pattern(&self, payload: Option<&str>) -> Result<Pattern> {
        let payload = payload.unwrap_or(self.config.payload.as_str());
        let payload: Payload = payload
            .parse()
            .with_context(|| format!("Invalid payload {:?}", payload))?;
        Ok(Pattern::from_payload(payload))
    }

    pub fn inject_options(&self, offset: Option<usize>) -> InjectOptions {
        InjectOptions {
            target_offset: offset.unwrap_or(self.config.target_offset),
        }
    }

    fn emit<T: Serialize>(&self, command: &'static str, result: T, text: String) -> Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&CommandOutput::ok(command, result))?
            );
        } else {
            println!("{}", text);
        }
        Ok(())
    }
}

pub fn show_pattern(settings: &Settings, payload: Option<&str>, offset: Option<usize>) -> Result<()> {
    let pattern = settings.pattern(payload)?;
    let offset = offset.unwrap_or(settings.config.target_offset);
    let output = PatternOutput {
        pattern,
        hex: pattern.to_string(),
        ascii: pattern.ascii_preview(),
        offset,
    };
    let text = format!(
        "Created steganographic pattern:\n{}",
        pattern_dump(&pattern, offset)
    );
    settings.emit("pattern", output, text)
}

#[derive(Debug, Serialize)]
struct InjectOutput {
    before: StructureReport,
    injection: InjectionReport,
    verification: VerificationReport,
    after: StructureReport,
}

pub fn inject(
    settings: &Settings,
    input: &Path,
    output: &Path,
    payload: Option<&str>,
    offset: Option<usize>,
) -> Result<()> {
    let pattern = settings.pattern(payload)?;
    let options = settings.inject_options(offset);

    let before = analyze_file(input)?;
    let injection = inject_pattern_into_pdf(input, &pattern, output, options)
        .with_context(|| format!("Failed to inject pattern into {}", input.display()))?;
    let verification = verify_file(output, pattern.as_bytes(), None)?;
    let after = analyze_file(output)?;

    let text = [
        format!("Analyzing input PDF structure...\n{}", structure_text(&before)),
        format!("Injecting pattern into {}...", input.display()),
        injection_text(&injection),
        verification_text(&file_name(output), &verification),
        format!("Analyzing output PDF structure...\n{}", structure_text(&after)),
    ]
    .join("\n\n");

    settings.emit(
        "inject",
        InjectOutput {
            before,
            injection,
            verification,
            after,
        },
        text,
    )
}

/// Returns whether the pattern was found.
pub fn verify(
    settings: &Settings,
    input: &Path,
    payload: Option<&str>,
    expected_offset: Option<usize>,
) -> Result<bool> {
    let pattern = settings.pattern(payload)?;
    let report = verify_file(input, pattern.as_bytes(), expected_offset)
        .with_context(|| format!("Failed to verify {}", input.display()))?;
    let found = report.found();
    let text = verification_text(&file_name(input), &report);
    settings.emit("verify", report, text)?;
    Ok(found)
}

pub fn analyze_command(settings: &Settings, input: &Path) -> Result<()> {
    let report = analyze_file(input)?;
    let text = structure_text(&report);
    settings.emit("analyze", report, text)
}

#[derive(Debug, Serialize)]
struct RoundtripOutput {
    original: VerificationReport,
    converted: VerificationReport,
    injection: InjectionReport,
    final_stream_offsets: Vec<usize>,
    final_file: VerificationReport,
}

/// Reserve a uniquely named intermediate PDF next to `output`.
///
/// The returned path is removed when dropped.
fn intermediate_file(output: &Path) -> Result<TempPath> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let file = tempfile::Builder::new()
        .prefix(&format!("{}.", stem))
        .suffix(".converted.pdf")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create intermediate PDF in {}", dir.display()))?;
    Ok(file.into_temp_path())
}

/// Verify, convert, verify, re-inject, verify.
///
/// The converter is not trusted to keep the pattern, so injection always runs
/// again on its output.
pub fn roundtrip(
    settings: &Settings,
    input: &Path,
    output: &Path,
    payload: Option<&str>,
    offset: Option<usize>,
    keep_temp: bool,
) -> Result<bool> {
    let pattern = settings.pattern(payload)?;
    let options = settings.inject_options(offset);
    let temp = intermediate_file(output)?;
    let (intermediate, cleanup) = if keep_temp {
        let path = temp.keep().context("Failed to keep intermediate PDF")?;
        (path, None)
    } else {
        (temp.to_path_buf(), Some(temp))
    };
    let mut steps = Vec::new();

    tracing::info!("1. Verifying original pattern");
    let original = verify_file(input, pattern.as_bytes(), None)
        .with_context(|| format!("Input PDF not found: {}", input.display()))?;
    steps.push(format!(
        "1. Verifying original steganographic pattern...\n{}",
        verification_text(&file_name(input), &original)
    ));

    tracing::info!("2. Converting through external tool");
    Converter::new(settings.config.converter.clone())
        .convert(input, &intermediate)
        .context("Conversion failed")?;
    steps.push(format!(
        "2. Converted {} -> {}",
        input.display(),
        intermediate.display()
    ));

    tracing::info!("3. Checking whether the pattern survived conversion");
    let converted = verify_file(&intermediate, pattern.as_bytes(), None)?;
    steps.push(format!(
        "3. Verifying if pattern survived (unlikely)...\n{}",
        verification_text(&file_name(&intermediate), &converted)
    ));

    tracing::info!("4. Re-injecting pattern");
    let injection = inject_pattern_into_pdf(&intermediate, &pattern, output, options)
        .context("Re-injection into converted PDF failed")?;
    steps.push(format!(
        "4. Re-injecting pattern into converted PDF...\n{}",
        injection_text(&injection)
    ));

    tracing::info!("5. Verifying final pattern");
    let final_file = verify_file(output, pattern.as_bytes(), None)?;
    let reloaded = PdfDocument::load(output)?;
    let final_stream_offsets: Vec<usize> = find_in_streams(&reloaded, pattern.as_bytes())
        .into_iter()
        .filter(|occurrence| occurrence.stream == injection.carrier)
        .map(|occurrence| occurrence.offset)
        .collect();
    let found = final_file.found() && final_stream_offsets.contains(&injection.offset);
    steps.push(format!(
        "5. Verifying final pattern...\n{}",
        verification_text(&file_name(output), &final_file)
    ));

    if let Some(cleanup) = cleanup {
        if let Err(e) = cleanup.close() {
            tracing::warn!(
                "Could not remove temporary PDF file {}: {}",
                intermediate.display(),
                e
            );
        }
    }
    steps.push(format!(
        "Process complete!\nFinal PDF with converter metadata and steganographic pattern: {}",
        output.display()
    ));

    settings.emit(
        "roundtrip",
        RoundtripOutput {
            original,
            converted,
            injection,
            final_stream_offsets,
            final_file,
        },
        steps.join("\n\n"),
    )?;
    Ok(found)
}

fn analyze_file(path: &Path) -> Result<StructureReport> {
    let document = PdfDocument::load(path)?;
    Ok(analyze(&document))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
