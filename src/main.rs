//! # Stylewrap CLI
//!
//! Usage:
//!   stylewrap request.json
//!   echo '{ ... }' | stylewrap
//!   stylewrap --example > request.json
//!   stylewrap request.json --compact
//!
//! Prints a JSON report of the laid-out lines, their bounding box and the
//! draw commands. Set `RUST_LOG=debug` to see line-by-line layout traces.

use std::env;
use std::fs;
use std::io::{self, Read};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_request_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => {
            eprintln!("✗ Failed to read input: {}", e);
            std::process::exit(1);
        }
    };

    let compact = args.iter().any(|a| a == "--compact");

    match stylewrap::render_json(&input) {
        Ok(report) => {
            let json = if compact {
                serde_json::to_string(&report)
            } else {
                serde_json::to_string_pretty(&report)
            };
            match json {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("✗ Failed to write report: {}", e);
                    std::process::exit(1);
                }
            }
            eprintln!(
                "✓ {} line(s), {:.1} x {:.1}{}",
                report.lines.len(),
                report.bbox.width,
                report.bbox.height,
                if report.truncated { " (truncated)" } else { "" }
            );
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_request_json() -> &'static str {
    r##"{
  "styles": {
    "header": { "fontId": "serif", "fontSize": 24, "color": { "r": 0.1, "g": 0.1, "b": 0.15 } },
    "b": { "fontId": "sans-bold", "fontSize": 14 },
    "small": { "fontId": "sans", "fontSize": 10, "color": { "r": 0.4, "g": 0.4, "b": 0.4 } }
  },
  "defaultStyle": { "fontId": "sans", "fontSize": 14 },
  "text": "<header>Quarterly Report</header><br/>Revenue grew <b>12%</b> over the previous quarter, driven by\tstrong demand.<br/><small>Figures are unaudited.</small>",
  "width": 320,
  "align": "Left",
  "maxLines": 0,
  "x": 20,
  "y": 20,
  "debug": false,
  "config": {
    "tabWidth": 4,
    "lineHeightMultiplier": 1.2,
    "pixelDensity": 2.0,
    "fontScale": 1.0
  }
}
"##
}
