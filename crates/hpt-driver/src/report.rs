use std::borrow::Cow;
use std::io::{self, Write};

use hpt_wire::{ControlHeader, Frame};
use serde::Serialize;

use crate::config::{DispatchConfig, ReportFormat};
use crate::engine::{EngineResponse, Severity};

/// Writes one report entry per frame.
///
/// # Text format
///
/// ```text
/// Discarding hp93000,config,0.1
/// file type: config (version 0.1)
/// task: PUT #9000000004abcd
/// task length: 20
/// binary length: 4
/// extra bytes: 0
/// answer: PASS
/// answer length: 4
/// status: 0 (ok)
/// ```
///
/// Task and answer bytes are copied verbatim; a newline is added only when
/// they do not already end in one. `binary length` / `extra bytes` appear
/// only for frames with a binary segment; `file type` only for headers whose
/// fields parse.
///
/// # JSON format
///
/// One object per line, tagged by `event` (`discarded` or `dispatched`).
/// Byte fields are rendered as lossy UTF-8.
pub struct Reporter<W: Write> {
    out: W,
    format: ReportFormat,
    echo_task: bool,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Entry<'a> {
    Discarded {
        line: u64,
        record: Cow<'a, str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_type: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<&'a str>,
    },
    Dispatched {
        line: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        task: Option<Cow<'a, str>>,
        task_len: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        declared_len: Option<u64>,
        extra: usize,
        answer: Cow<'a, str>,
        answer_len: usize,
        status: i32,
        severity: Severity,
    },
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, config: &DispatchConfig) -> Self {
        Self {
            out,
            format: config.report_format,
            echo_task: config.echo_task,
        }
    }

    /// Report a control header that was not dispatched.
    ///
    /// # Errors
    ///
    /// Any error from the underlying writer.
    pub fn discarded(&mut self, frame: &Frame) -> io::Result<()> {
        let header = ControlHeader::parse(frame.line());
        match self.format {
            ReportFormat::Text => {
                self.out.write_all(b"Discarding ")?;
                self.write_line(frame.line())?;
                if let Some(h) = header {
                    writeln!(self.out, "file type: {} (version {})", h.file_type, h.version)?;
                }
                Ok(())
            }
            ReportFormat::Json => self.write_json(&Entry::Discarded {
                line: frame.line_number,
                record: trimmed_lossy(frame.line()),
                file_type: header.map(|h| h.file_type),
                version: header.map(|h| h.version),
            }),
        }
    }

    /// Report a dispatched frame and the engine's answer.
    ///
    /// # Errors
    ///
    /// Any error from the underlying writer.
    pub fn dispatched(&mut self, frame: &Frame, response: &EngineResponse) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => self.write_text(frame, response),
            ReportFormat::Json => self.write_json(&Entry::Dispatched {
                line: frame.line_number,
                task: self.echo_task.then(|| String::from_utf8_lossy(&frame.bytes)),
                task_len: frame.len(),
                declared_len: frame.segment.map(|s| s.declared_len),
                extra: frame.extra(),
                answer: String::from_utf8_lossy(&response.answer),
                answer_len: response.answer.len(),
                status: response.status.0,
                severity: response.status.severity(),
            }),
        }
    }

    /// # Errors
    ///
    /// Any error from the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Flush and hand back the writer.
    ///
    /// # Errors
    ///
    /// Any error from the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_text(&mut self, frame: &Frame, response: &EngineResponse) -> io::Result<()> {
        if self.echo_task {
            self.write_field("task", &frame.bytes)?;
        }
        writeln!(self.out, "task length: {}", frame.len())?;
        if let Some(seg) = frame.segment {
            writeln!(self.out, "binary length: {}", seg.declared_len)?;
            writeln!(self.out, "extra bytes: {}", seg.extra)?;
        }
        self.write_field("answer", &response.answer)?;
        writeln!(self.out, "answer length: {}", response.answer.len())?;
        writeln!(
            self.out,
            "status: {} ({})",
            response.status,
            response.status.severity().as_str()
        )
    }

    /// `label: <bytes>`, or just `label:` when there are no bytes.
    fn write_field(&mut self, label: &str, bytes: &[u8]) -> io::Result<()> {
        write!(self.out, "{label}:")?;
        if !bytes.is_empty() {
            self.out.write_all(b" ")?;
        }
        self.write_line(bytes)
    }

    fn write_line(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        if bytes.last() != Some(&b'\n') {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    fn write_json(&mut self, entry: &Entry<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, entry)?;
        self.out.write_all(b"\n")
    }
}

fn trimmed_lossy(line: &[u8]) -> Cow<'_, str> {
    let end = line
        .iter()
        .rposition(|&b| b != b'\n' && b != b'\r')
        .map_or(0, |i| i + 1);
    String::from_utf8_lossy(&line[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Status;
    use hpt_reader::FrameReader;

    fn frames(input: &[u8]) -> Vec<Frame> {
        FrameReader::new(input).collect::<Result<_, _>>().unwrap()
    }

    fn render(config: DispatchConfig, input: &[u8], response: &EngineResponse) -> String {
        let mut reporter = Reporter::new(Vec::new(), &config);
        for frame in frames(input) {
            if frame.is_task() {
                reporter.dispatched(&frame, response).unwrap();
            } else {
                reporter.discarded(&frame).unwrap();
            }
        }
        String::from_utf8(reporter.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn text_report_for_plain_task() {
        let out = render(
            DispatchConfig::default(),
            b"hp93000,config,0.1\nFTST?\n",
            &EngineResponse::ok(b"PASS".to_vec()),
        );
        insta::assert_snapshot!(out.trim_end(), @r"
        Discarding hp93000,config,0.1
        file type: config (version 0.1)
        task: FTST?
        task length: 6
        answer: PASS
        answer length: 4
        status: 0 (ok)
        ");
    }

    #[test]
    fn text_report_for_binary_task() {
        let out = render(
            DispatchConfig::default(),
            b"PUT #9000000005ab\ncd\n",
            &EngineResponse {
                answer: Vec::new(),
                status: Status(-5),
            },
        );
        insta::assert_snapshot!(out.trim_end(), @r"
        task: PUT #9000000005ab
        cd
        task length: 21
        binary length: 5
        extra bytes: 3
        answer:
        answer length: 0
        status: -5 (error)
        ");
    }

    #[test]
    fn text_report_without_echo_omits_task_bytes() {
        let config = DispatchConfig {
            echo_task: false,
            ..DispatchConfig::default()
        };
        let out = render(config, b"FTST?\n", &EngineResponse::ok(Vec::new()));
        assert!(!out.contains("task: "));
        assert!(out.starts_with("task length: 6\n"));
    }

    #[test]
    fn unparsed_header_is_reported_verbatim() {
        let out = render(DispatchConfig::default(), b"hp93000\n", &EngineResponse::ok(Vec::new()));
        assert_eq!(out, "Discarding hp93000\n");

        let config = DispatchConfig {
            report_format: ReportFormat::Json,
            ..DispatchConfig::default()
        };
        let out = render(config, b"hp93000\n", &EngineResponse::ok(Vec::new()));
        assert_eq!(out, "{\"event\":\"discarded\",\"line\":1,\"record\":\"hp93000\"}\n");
    }

    #[test]
    fn json_report_is_one_object_per_line() {
        let config = DispatchConfig {
            report_format: ReportFormat::Json,
            ..DispatchConfig::default()
        };
        let out = render(
            config,
            b"hp93000,config,0.1\r\nFTST?\n",
            &EngineResponse {
                answer: b"FTST P".to_vec(),
                status: Status::WARNING,
            },
        );
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "discarded");
        assert_eq!(lines[0]["record"], "hp93000,config,0.1");
        assert_eq!(lines[0]["file_type"], "config");
        assert_eq!(lines[0]["version"], "0.1");
        assert_eq!(lines[1]["event"], "dispatched");
        assert_eq!(lines[1]["line"], 2);
        assert_eq!(lines[1]["task"], "FTST?\n");
        assert_eq!(lines[1]["task_len"], 6);
        assert_eq!(lines[1]["answer"], "FTST P");
        assert_eq!(lines[1]["status"], -1);
        assert_eq!(lines[1]["severity"], "warning");
        assert!(lines[1].get("declared_len").is_none());
    }
}
