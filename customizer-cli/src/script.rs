//! Design scripts: one command per line.
//!
//! ```text
//! # comments and blank lines are ignored
//! upload-front-image shirt-front.png
//! upload-back-image shirt-back.png
//! start-designing
//! add-text HELLO @ Impact
//! set-property fill #EF4444
//! switch-side back
//! upload-artwork logo.png
//! set-customer name Ada Lovelace
//! set-verified yes
//! sign 10,100 120,40 260,110 | 280,60 300,90
//! export
//! save
//! ```
//!
//! Paths are relative to the script's directory and are read when the script
//! is parsed.

use std::path::{Path, PathBuf};

use customizer_core::{
    Command, CustomerField, CustomizerError, CustomizerResult, ImageSource, Property,
    SelectionTarget, Side,
};
use customizer_renderer::{source_from_file, SignaturePad};

/// A parsed command and the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    /// 1-based line number.
    pub number: usize,
    /// The command.
    pub command: Command,
}

/// A parsed design script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    lines: Vec<ScriptLine>,
}

impl Script {
    /// Parse script text, resolving paths against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidCommand`] naming the first bad line.
    pub fn parse(text: &str, base_dir: &Path) -> CustomizerResult<Self> {
        let mut lines = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let number = index + 1;
            let command = parse_line(raw, base_dir).map_err(|e| {
                CustomizerError::InvalidCommand(format!("line {number}: {}", detail(&e)))
            })?;
            if let Some(command) = command {
                lines.push(ScriptLine { number, command });
            }
        }
        Ok(Self { lines })
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is invalid.
    pub fn from_file(path: &Path) -> CustomizerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CustomizerError::InvalidCommand(format!("Failed to read {}: {e}", path.display()))
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&text, &base_dir)
    }

    /// Parsed lines in order.
    #[must_use]
    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the script has no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl IntoIterator for Script {
    type Item = ScriptLine;
    type IntoIter = std::vec::IntoIter<ScriptLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

fn detail(err: &CustomizerError) -> String {
    match err {
        CustomizerError::InvalidCommand(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn invalid(msg: impl Into<String>) -> CustomizerError {
    CustomizerError::InvalidCommand(msg.into())
}

/// Parse one script line. Blank lines and comments yield `None`.
///
/// # Errors
///
/// Returns [`CustomizerError::InvalidCommand`] for unknown verbs or bad
/// arguments, and the loader's error for unreadable image files.
pub fn parse_line(line: &str, base_dir: &Path) -> CustomizerResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match verb {
        "upload-front-image" => Command::UploadImage {
            side: Side::Front,
            source: load(base_dir, rest)?,
        },
        "upload-back-image" => Command::UploadImage {
            side: Side::Back,
            source: load(base_dir, rest)?,
        },
        "clear-front-image" => Command::ClearImage(Side::Front),
        "clear-back-image" => Command::ClearImage(Side::Back),
        "start-designing" => Command::StartDesigning,
        "set-product-name" => Command::SetProductName(required(rest, "product name")?.into()),
        "set-customer" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| invalid("usage: set-customer <field> <value>"))?;
            Command::SetCustomer {
                field: field.parse::<CustomerField>()?,
                value: value.trim().to_string(),
            }
        }
        "set-verified" => Command::SetVerified(parse_bool(rest)?),
        "sign" => Command::SetSignature(Some(sign(rest)?)),
        "set-signature" => Command::SetSignature(Some(load(base_dir, rest)?)),
        "clear-signature" => Command::SetSignature(None),
        "set-art-print-color" => Command::SetArtPrintColor(required(rest, "color")?.into()),
        "add-text" => match rest.rsplit_once(" @ ") {
            Some((content, font)) => Command::AddText {
                content: content.to_string(),
                font: Some(font.trim().to_string()),
            },
            None => Command::AddText {
                content: rest.to_string(),
                font: None,
            },
        },
        "upload-artwork" => Command::UploadArtwork(load(base_dir, rest)?),
        "set-font" => Command::SetFont(required(rest, "font")?.into()),
        "set-property" => {
            let (name, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| invalid("usage: set-property fill|font <value>"))?;
            let value = value.trim().to_string();
            match name {
                "fill" | "color" => Command::SetProperty(Property::Fill(value)),
                "font" | "font-family" => Command::SetProperty(Property::FontFamily(value)),
                other => return Err(invalid(format!("unknown property {other:?}"))),
            }
        }
        "delete-selection" => Command::DeleteSelection,
        "click" => {
            let (x, y) = parse_point(&rest.split_whitespace().collect::<Vec<_>>().join(","))?;
            Command::Click { x, y }
        }
        "select" => match rest {
            "none" => Command::Select(SelectionTarget::None),
            "background" => Command::Select(SelectionTarget::Background),
            other => return Err(invalid(format!("cannot select {other:?}"))),
        },
        "switch-side" => Command::SwitchSide(rest.parse::<Side>()?),
        "reset-side" => Command::ResetSide,
        "start-over" => Command::StartOver,
        "export" => Command::Export,
        "save" => Command::Save,
        "gallery" => Command::Gallery,
        other => return Err(invalid(format!("unknown command {other:?}"))),
    };
    Ok(Some(command))
}

fn required<'a>(rest: &'a str, what: &str) -> CustomizerResult<&'a str> {
    if rest.is_empty() {
        return Err(invalid(format!("missing {what}")));
    }
    Ok(rest)
}

fn load(base_dir: &Path, rest: &str) -> CustomizerResult<ImageSource> {
    let path = PathBuf::from(required(rest, "file path")?);
    let path = if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    };
    Ok(source_from_file(&path)?)
}

fn parse_bool(value: &str) -> CustomizerResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(invalid(format!("expected yes or no, got {other:?}"))),
    }
}

fn parse_point(token: &str) -> CustomizerResult<(f32, f32)> {
    let (x, y) = token
        .split_once(',')
        .ok_or_else(|| invalid(format!("expected x,y, got {token:?}")))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| invalid(format!("bad coordinate {v:?}: {e}")))
    };
    Ok((coord(x)?, coord(y)?))
}

/// Draw `x,y x,y ... | x,y ...` strokes on a signature pad.
fn sign(rest: &str) -> CustomizerResult<ImageSource> {
    let mut pad = SignaturePad::new();
    for stroke in rest.split('|') {
        let points = stroke
            .split_whitespace()
            .map(parse_point)
            .collect::<CustomizerResult<Vec<_>>>()?;
        pad.add_stroke(points);
    }
    pad.to_source()?
        .ok_or_else(|| invalid("sign needs at least one point"))
}
