//! Purpose: Render pretty JSON reports with optional ANSI colorization for terminals.
//! Exports: colorize_json.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals serde_json::to_string_pretty.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use serde_json::{Map, Value};

const INDENT: &str = "  ";

#[derive(Copy, Clone)]
enum Tone {
    Key,
    Text,
    Number,
    Flag,
    Plain,
}

impl Tone {
    // 8/16-color codes only; bright variants wash out on light themes.
    fn code(self) -> &'static str {
        match self {
            Tone::Key => "36",
            Tone::Text => "32",
            Tone::Number => "33",
            Tone::Flag => "35",
            Tone::Plain => "39",
        }
    }
}

struct Painter {
    enabled: bool,
    out: String,
}

impl Painter {
    fn paint(&mut self, text: &str, tone: Tone) {
        if self.enabled {
            self.out.push_str("\u{1b}[");
            self.out.push_str(tone.code());
            self.out.push('m');
            self.out.push_str(text);
            self.out.push_str("\u{1b}[0m");
        } else {
            self.out.push_str(text);
        }
    }

    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        self.out.push_str(&INDENT.repeat(depth));
    }

    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.paint("null", Tone::Plain),
            Value::Bool(flag) => self.paint(if *flag { "true" } else { "false" }, Tone::Flag),
            Value::Number(num) => self.paint(&num.to_string(), Tone::Number),
            Value::String(text) => self.paint(&quoted(text), Tone::Text),
            Value::Array(items) => self.array(items, depth),
            Value::Object(map) => self.object(map, depth),
        }
    }

    fn array(&mut self, items: &[Value], depth: usize) {
        if items.is_empty() {
            self.paint("[]", Tone::Plain);
            return;
        }
        self.paint("[", Tone::Plain);
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                self.paint(",", Tone::Plain);
            }
            self.newline(depth + 1);
            self.value(item, depth + 1);
        }
        self.newline(depth);
        self.paint("]", Tone::Plain);
    }

    fn object(&mut self, map: &Map<String, Value>, depth: usize) {
        if map.is_empty() {
            self.paint("{}", Tone::Plain);
            return;
        }
        self.paint("{", Tone::Plain);
        for (idx, (key, item)) in map.iter().enumerate() {
            if idx > 0 {
                self.paint(",", Tone::Plain);
            }
            self.newline(depth + 1);
            self.paint(&quoted(key), Tone::Key);
            self.paint(":", Tone::Plain);
            self.out.push(' ');
            self.value(item, depth + 1);
        }
        self.newline(depth);
        self.paint("}", Tone::Plain);
    }
}

fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

pub fn colorize_json(value: &Value, use_color: bool) -> String {
    let mut painter = Painter {
        enabled: use_color,
        out: String::new(),
    };
    painter.value(value, 0);
    painter.out
}
