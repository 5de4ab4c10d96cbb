use serde::Serialize;
use std::io::{self, Write};

/// JSON document written to stdout for every invocation.
///
/// Either `text` and `segments` or `error` is populated, as selected by
/// `success`. Fields are private so only the two constructors can build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    segments: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(text: impl Into<String>, segments: usize) -> Self {
        Self {
            success: true,
            text: Some(text.into()),
            segments: Some(segments),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            text: None,
            segments: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn segments(&self) -> Option<usize> {
        self.segments
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Render the envelope the way it is written to stdout, without the newline
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        self.serialize(&mut serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter))?;
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Character encoding of the stdout document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    #[default]
    Utf8,
}

/// Compact JSON with `", "` and `": "` separators; non-ASCII is written as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }
}

/// Write one envelope followed by a newline
pub fn write_envelope<W: Write>(
    mut writer: W,
    envelope: &ResponseEnvelope,
    encoding: OutputEncoding,
) -> anyhow::Result<()> {
    let json = envelope.to_json()?;

    let bytes = match encoding {
        OutputEncoding::Utf8 => json.into_bytes(),
    };

    writer.write_all(&bytes)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Print envelope to stdout
pub fn print_to_console(envelope: &ResponseEnvelope) -> anyhow::Result<()> {
    let stdout = io::stdout();
    write_envelope(stdout.lock(), envelope, OutputEncoding::Utf8)
}
