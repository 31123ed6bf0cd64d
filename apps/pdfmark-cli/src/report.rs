//! Text and JSON rendering of command results

use pdfmark_core::{InjectionReport, Pattern, StructureReport, VerificationReport};
use serde::Serialize;

/// JSON envelope printed for every command with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput<T: Serialize> {
    pub success: bool,
    pub command: &'static str,
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandOutput<T> {
    pub fn ok(command: &'static str, result: T) -> Self {
        Self {
            success: true,
            command,
            result: Some(result),
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub error: String,
    pub causes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternOutput {
    pub pattern: Pattern,
    pub hex: String,
    pub ascii: String,
    pub offset: usize,
}

/// Hex dump of the pattern as a single row at `offset`.
pub fn pattern_dump(pattern: &Pattern, offset: usize) -> String {
    let header = (0..pattern.len())
        .map(|i| format!("{:02x}", i))
        .collect::<Vec<_>>()
        .join("  ");
    let bytes = pattern
        .as_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "Offset   {}    ASCII\n{:x}   {}    {}",
        header,
        offset,
        bytes,
        pattern.ascii_preview()
    )
}

pub fn verification_text(name: &str, report: &VerificationReport) -> String {
    let mut out = format!("Pattern verification in {}:\n", name);
    if !report.found() {
        out.push_str("Pattern not found!");
        return out;
    }
    out.push_str(&format!(
        "Found pattern at {} location(s):",
        report.offsets.len()
    ));
    for &offset in &report.offsets {
        out.push_str(&format!("\n  Offset: 0x{:x}", offset));
        if report.expected_offset == Some(offset) {
            out.push_str("\n  Matches expected offset!");
        }
    }
    out
}

pub fn structure_text(report: &StructureReport) -> String {
    let mut out = String::from("PDF Structure Analysis:");
    for font in &report.font_streams {
        out.push_str(&format!(
            "\nFound font object: {}\nStream size: {} bytes",
            font.handle, font.size
        ));
    }
    out.push_str(&format!(
        "\nTotal streams found: {}\nFont streams found: {}",
        report.stream_count, report.font_stream_count
    ));
    out
}

pub fn injection_text(report: &InjectionReport) -> String {
    format!(
        "Injected pattern into stream {} ({}, {} bytes) at offset 0x{:x}\nWrote {}",
        report.carrier,
        report.carrier_type.as_deref().unwrap_or("untyped"),
        report.carrier_len,
        report.offset,
        report.output.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmark_core::{build_pattern, FontStreamInfo, StreamHandle};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_pattern_dump_row() {
        let pattern = build_pattern(b"GJW").unwrap();
        let dump = pattern_dump(&pattern, 0x184B0);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(
            lines[0],
            "Offset   00  01  02  03  04  05  06  07    ASCII"
        );
        assert_eq!(lines[1], "184b0   6b 47 7d e8 4a b4 17 57    kG}.J..W");
    }

    #[test]
    fn test_verification_text_not_found() {
        let report = VerificationReport {
            offsets: vec![],
            expected_offset: None,
        };
        assert_eq!(
            verification_text("out.pdf", &report),
            "Pattern verification in out.pdf:\nPattern not found!"
        );
    }

    #[test]
    fn test_verification_text_marks_expected() {
        let report = VerificationReport {
            offsets: vec![0x10, 0x20],
            expected_offset: Some(0x20),
        };
        let text = verification_text("out.pdf", &report);
        assert!(text.contains("Found pattern at 2 location(s):"));
        assert!(text.contains("Offset: 0x10"));
        assert!(text.ends_with("Offset: 0x20\n  Matches expected offset!"));
    }

    #[test]
    fn test_structure_text() {
        let report = StructureReport {
            stream_count: 3,
            font_stream_count: 1,
            font_streams: vec![FontStreamInfo {
                handle: StreamHandle::new(7, 0),
                size: 2048,
            }],
        };
        let text = structure_text(&report);
        assert!(text.contains("Found font object: 7 0 R"));
        assert!(text.contains("Stream size: 2048 bytes"));
        assert!(text.contains("Total streams found: 3"));
        assert!(text.contains("Font streams found: 1"));
    }

    #[test]
    fn test_injection_text_and_json() {
        let report = InjectionReport {
            carrier: StreamHandle::new(5, 0),
            carrier_type: None,
            carrier_len: 50,
            offset: 42,
            output: PathBuf::from("out.pdf"),
        };
        assert!(injection_text(&report).contains("(untyped, 50 bytes) at offset 0x2a"));

        let json = serde_json::to_value(CommandOutput::ok("inject", &report)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["command"], "inject");
        assert_eq!(json["result"]["offset"], 42);
        assert_eq!(json["result"]["carrier"]["number"], 5);
    }
}
