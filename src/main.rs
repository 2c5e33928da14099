//! # Folio CLI
//!
//! Usage:
//!   folio input.json -o output.pdf
//!   echo '{ ... }' | folio -o output.pdf
//!   folio --example > hello.json

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_json());
        return;
    }

    let input_path = args.get(1).filter(|a| !a.starts_with('-'));
    let input = match input_path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => fail(&format!("Failed to read input: {}", e)),
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    let spec: folio::DocumentSpec = match serde_json::from_str(&input) {
        Ok(spec) => spec,
        Err(e) => fail(&folio::FolioError::from(e).to_string()),
    };
    let base_dir = input_path
        .and_then(|p| Path::new(p).parent())
        .unwrap_or_else(|| Path::new("."));

    match folio::render(&spec, base_dir) {
        Ok(pdf_bytes) => {
            if let Err(e) = fs::write(&output_path, &pdf_bytes) {
                fail(&format!("Failed to write {}: {}", output_path, e));
            }
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
        }
        Err(e) => fail(&format!("Failed to render document: {}", e)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}

fn example_json() -> &'static str {
    r##"{
  "options": {
    "unit": "mm",
    "size": "A4",
    "aliasNbPages": "{nb}",
    "metadata": { "title": "Hello", "author": "Folio" }
  },
  "header": [
    { "op": "setFont", "family": "helvetica", "style": "B", "size": 15 },
    { "op": "cell", "w": 80 },
    { "op": "cell", "w": 30, "h": 10, "text": "Title", "border": 1, "align": "C" },
    { "op": "ln", "h": 20 }
  ],
  "footer": [
    { "op": "setY", "y": -15 },
    { "op": "setFont", "family": "helvetica", "style": "I", "size": 8 },
    { "op": "cell", "w": 0, "h": 10, "text": "Page {nb}", "align": "C" }
  ],
  "pages": [
    {
      "ops": [
        { "op": "setFont", "family": "courier", "size": 12 },
        { "op": "setFillColor", "color": [230, 230, 250] },
        { "op": "cell", "w": 0, "h": 10, "text": "Printing line number 1", "ln": 1, "fill": true },
        { "op": "multiCell", "w": 0, "h": 5, "text": "Long paragraphs wrap at spaces and are justified to the cell width unless another alignment is given." },
        { "op": "ln" },
        { "op": "write", "h": 5, "text": "Visit the ", "link": null },
        { "op": "write", "h": 5, "text": "end of the document", "link": "#end" }
      ]
    },
    {
      "orientation": "L",
      "ops": [
        { "op": "setLink", "name": "end", "y": -1 },
        { "op": "setDrawColor", "color": [0, 80, 180] },
        { "op": "setLineWidth", "width": 0.5 },
        { "op": "rect", "x": 20, "y": 40, "w": 60, "h": 30, "style": "D" },
        { "op": "line", "x1": 20, "y1": 40, "x2": 80, "y2": 70 }
      ]
    }
  ]
}
"##
}
