use crate::ir::{PacketIr, FieldIr};

const INDENT: &str = "    ";

/// Line-oriented source builder. Blocks are emitted at indentation zero;
/// the merge engine shifts them to the marker's column.
#[derive(Debug, Default)]
pub struct CodeWriter {
    lines:  Vec<String>,
    indent: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", INDENT.repeat(self.indent), text));
        }
    }

    /// Writes `text` and indents what follows.
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    /// Dedents and writes `text`.
    pub fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    pub fn finish(self) -> String {
        self.lines.iter().map(|line| format!("{}\n", line)).collect()
    }
}

/// What an emitter produces for one marker region.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    /// Replaces the region wholesale.
    Block(String),
    /// Merged positionally into existing handler bodies.
    Handlers(Vec<HandlerDecl>),
}

/// One generated handler method header, ending in `{`.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerDecl {
    pub name:          String,
    pub signature:     String,
    pub unimplemented: bool,
}

/// Packet ids are printed as `0x00`.
pub fn hex_id(id: i32) -> String {
    format!("{:#04X}", id)
}

/// The text of a field's read call, with its parameter rendered against the
/// packet's earlier bindings.
pub fn read_call(buffer: &str, packet: &PacketIr, field: &FieldIr, suffix: &str) -> String {
    let param = field
        .ty
        .param
        .as_ref()
        .map(|expr| expr.render(&packet.fields))
        .unwrap_or_default();
    if field.array {
        return format!(
            "(0..{}).map(|_| {}.read_{}()).collect::<Result<Vec<_>, _>>(){}",
            param, buffer, field.ty.base, suffix
        );
    }
    format!("{}.read_{}({}){}", buffer, field.ty.base, param, suffix)
}
