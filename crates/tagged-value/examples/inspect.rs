//! Simple reader to inspect marshalled value files.
//!
//! Usage: `cargo run --example inspect -- <file.json> [--tagged]`

use std::fs;

use tagged_value::{Mapping, Value, unmarshal, unmarshal_tagged};

fn format_scalar(v: &Value) -> Option<String> {
    let text = match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("{}", b),
        Value::Int(n) => format!("{}", n),
        Value::Double(x) => format!("{:.6}", x),
        Value::String(s) => {
            let preview: String = s.chars().take(80).collect();
            if s.chars().count() > 80 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        Value::Raw(bytes) => format!("RAW[{}]", bytes.len()),
        Value::Timestamp(ts) => format!("TIMESTAMP({})", ts),
        Value::Identifier(id) => format!("ID({})", id),
        Value::BoolArray(values) => format!("{:?}", values),
        Value::IntArray(values) => format!("{:?}", values),
        Value::DoubleArray(values) => format!("{:?}", values),
        Value::StringArray(values) => format!("{:?}", values),
        Value::TimestampArray(values) => {
            let texts: Vec<String> = values.iter().map(|ts| ts.to_string()).collect();
            format!("{:?}", texts)
        }
        Value::Artefact(_) | Value::Mapping(_) | Value::Sequence(_) => return None,
    };
    Some(text)
}

fn print_entries(mapping: &Mapping, indent: usize) {
    for (name, child) in mapping {
        print_value(&format!("{} ({})", name, child.tag()), child, indent);
    }
}

fn print_value(label: &str, v: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    if let Some(text) = format_scalar(v) {
        println!("{}{} = {}", pad, label, text);
        return;
    }
    match v {
        Value::Artefact(artefact) => {
            println!("{}{} <{}>", pad, label, artefact.type_id);
            print_entries(&artefact.content, indent + 1);
        }
        Value::Mapping(mapping) => {
            println!("{}{} {{{} entries}}", pad, label, mapping.len());
            print_entries(mapping, indent + 1);
        }
        Value::Sequence(items) => {
            println!("{}{} [{} items]", pad, label, items.len());
            for (i, item) in items.iter().enumerate() {
                print_value(&format!("[{}] ({})", i, item.tag()), item, indent + 1);
            }
        }
        _ => {}
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "value.json".to_string());
    let tagged = args.any(|arg| arg == "--tagged");

    println!("Reading: {}", path);

    let text = fs::read_to_string(&path).expect("Failed to read file");
    println!("File size: {} bytes", text.len());

    let json: serde_json::Value = serde_json::from_str(&text).expect("Failed to parse JSON");
    let decoded = if tagged { unmarshal_tagged(&json) } else { unmarshal(&json) };
    let value = match decoded {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Failed to unmarshal ({}): {}", err.kind().name(), err);
            std::process::exit(1);
        }
    };

    println!("\n=== Value Tree ===");
    print_value(&format!("root ({})", value.tag()), &value, 0);
}
