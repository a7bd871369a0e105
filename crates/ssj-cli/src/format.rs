//! Renders [`Value`]s the way the REPL prints them.

use ssj_proto::{Pointer, Value};

fn hex_pointer(ptr: Pointer) -> String {
    let digits = usize::from(ptr.width()) * 2;
    format!("{:0width$x}h", ptr.address(), width = digits)
}

fn escape_c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render `value` as the REPL would print it.
///
/// `verbose` controls whether `OBJ` values are expanded; non-verbose mode
/// always prints `{...}` for objects.
#[must_use]
pub fn format_value(value: &Value, verbose: bool) -> String {
    match value {
        Value::Undef => "undefined".to_string(),
        Value::Unused => "unused".to_string(),
        Value::Null => "null".to_string(),
        Value::True => "true".to_string(),
        Value::False => "false".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Str(s) => escape_c_string(s),
        Value::Buf(b) => format!("buf:{}-bytes", b.len()),
        Value::Obj { ptr, .. } => {
            if verbose {
                format!("{{obj:\"{}\"}}", hex_pointer(*ptr))
            } else {
                "{...}".to_string()
            }
        }
        Value::Ptr(ptr) => format!("{{ptr:\"{}\"}}", hex_pointer(*ptr)),
        Value::LightFunc { ptr, .. } => format!("{{lightfunc:\"{}\"}}", hex_pointer(*ptr)),
        Value::HeapPtr(ptr) => format!("{{heapptr:\"{}\"}}", hex_pointer(*ptr)),
    }
}

/// Format a float using the shortest representation that round-trips back
/// to the same bit pattern (Rust's default `f64` `Display` already
/// guarantees this).
fn format_float(f: f64) -> String {
    format!("{f}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_and_numbers() {
        assert_eq!(format_value(&Value::Null, false), "null");
        assert_eq!(format_value(&Value::True, false), "true");
        assert_eq!(format_value(&Value::Int(3), false), "3");
        assert_eq!(format_value(&Value::Float(1.5), false), "1.5");
    }

    #[test]
    fn strings_are_c_escaped() {
        assert_eq!(
            format_value(&Value::Str("line1\nline2".into()), false),
            "\"line1\\nline2\""
        );
    }

    #[test]
    fn buffers_show_length() {
        assert_eq!(format_value(&Value::Buf(vec![0; 5]), false), "buf:5-bytes");
    }

    #[test]
    fn pointer_hex_padded_to_width() {
        let ptr = Pointer::new(4, 0xDEAD_BEEF).unwrap();
        assert_eq!(format_value(&Value::Ptr(ptr), false), "{ptr:\"deadbeefh\"}");
        let ptr8 = Pointer::new(8, 0x1234).unwrap();
        assert_eq!(
            format_value(&Value::HeapPtr(ptr8), false),
            "{heapptr:\"0000000000001234h\"}"
        );
    }

    #[test]
    fn non_verbose_obj_is_elided() {
        let ptr = Pointer::new(4, 0).unwrap();
        let obj = Value::Obj { class: 1, ptr };
        assert_eq!(format_value(&obj, false), "{...}");
        assert_eq!(format_value(&obj, true), "{obj:\"00000000h\"}");
    }
}
