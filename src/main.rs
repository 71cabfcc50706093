use anchor_edit::{AnchoredEditor, EditRequest, EditResponse, EditorConfig, resolve_execution_id};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

/// Anchored search-and-replace with structural validation and automatic revert
#[derive(Parser, Debug)]
#[command(name = "anchor-edit")]
#[command(version = "0.1.0")]
#[command(about = "Surgical anchored edits that revert when they break the file", long_about = None)]
struct Args {
    /// File to edit (overrides `file_path` in the request)
    #[arg(short, long)]
    file: Option<String>,

    /// Exact text identifying the edit location
    #[arg(long)]
    find: Option<String>,

    /// Text to put in place of the anchor
    #[arg(long)]
    replace: Option<String>,

    /// JSON file containing an edit request (omit, with no --find, to read stdin)
    #[arg(short, long)]
    request: Option<String>,

    /// Whitespace-tolerant matching instead of byte-exact
    #[arg(long)]
    fuzzy: bool,

    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,

    /// Only check that the anchor matches exactly once
    #[arg(long)]
    check: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Output structured JSON instead of human-readable
    #[arg(short, long)]
    json: bool,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,
}

/// Read an EditRequest from a file path, or from stdin when `path` is None
fn read_edit_request(path: Option<&String>) -> Result<EditRequest, Box<dyn std::error::Error>> {
    let json_str = if let Some(p) = path {
        fs::read_to_string(p)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let request: EditRequest = serde_json::from_str(&json_str)?;
    Ok(request)
}

/// Assemble the request from flags, a request file, or stdin
fn build_request(args: &Args) -> Result<EditRequest, Box<dyn std::error::Error>> {
    let mut request = match (&args.find, &args.replace) {
        (Some(find), replace) if args.check || replace.is_some() => EditRequest {
            execution_id: "auto".to_string(),
            file_path: String::new(),
            find_block: find.clone(),
            replace_block: replace.clone().unwrap_or_default(),
            strict: None,
            dry_run: false,
        },
        (Some(_), None) => return Err("--find requires --replace unless --check is given".into()),
        (None, Some(_)) => return Err("--replace requires --find".into()),
        (None, None) => read_edit_request(args.request.as_ref())?,
        // Covered by the guarded first arm (replace.is_some() holds)
        (Some(_), Some(_)) => unreachable!(),
    };

    if let Some(file) = &args.file {
        request.file_path = file.clone();
    }
    if request.file_path.is_empty() {
        return Err("no file given: pass --file or set file_path in the request".into());
    }
    if args.fuzzy {
        request.strict = Some(false);
    }
    if args.dry_run {
        request.dry_run = true;
    }
    Ok(request)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.as_ref().map(EditorConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            let response = EditResponse::failure(resolve_execution_id("auto"), e.to_string());
            output_response(&response, args.json, args.output.as_ref());
            std::process::exit(1);
        }
    };

    let request = match build_request(&args) {
        Ok(request) => request,
        Err(e) => {
            let response = EditResponse::failure(
                resolve_execution_id("auto"),
                format!("Invalid edit request: {}", e),
            );
            output_response(&response, args.json, args.output.as_ref());
            std::process::exit(1);
        }
    };

    let execution_id = resolve_execution_id(&request.execution_id);
    let mut editor = AnchoredEditor::new(config);

    let response = if args.check {
        let (unique, message) = editor.check(&request);
        EditResponse {
            execution_id,
            success: unique,
            result: unique.then(|| serde_json::json!({ "message": message })),
            error_kind: (!unique).then(|| "anchor".to_string()),
            match_count: None,
            error: (!unique).then_some(message),
        }
    } else {
        match editor.apply(&request) {
            Ok(result) => EditResponse::success(execution_id, &result),
            Err(e) => EditResponse::from_error(execution_id, &e),
        }
    };

    output_response(&response, args.json, args.output.as_ref());

    if !response.success {
        std::process::exit(1);
    }
}

/// Format and output the response
fn output_response(response: &EditResponse, json_mode: bool, output_path: Option<&String>) {
    let output = if json_mode {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| {
            r#"{"error": "Failed to serialize response"}"#.to_string()
        })
    } else if response.success {
        human_summary(response)
    } else {
        format!("Error: {}", response.error.as_deref().unwrap_or("Unknown error"))
    };

    if let Some(path) = output_path {
        if let Err(e) = fs::write(path, &output) {
            eprintln!("Failed to write output to '{}': {}", path, e);
            std::process::exit(1);
        }
    } else {
        println!("{}", output);
    }
}

fn human_summary(response: &EditResponse) -> String {
    let Some(result) = &response.result else {
        return "OK".to_string();
    };

    let mut lines = vec![result["message"].as_str().unwrap_or("OK").to_string()];
    if let Some(changed) = result["lines_changed"].as_u64() {
        lines.push(format!("Lines changed: {}", changed));
    }
    if let Some(checksum) = result["new_checksum"].as_str() {
        lines.push(format!("New checksum: {}", checksum));
    }
    if result["valid"] == false {
        lines.push(format!(
            "Warning: result would be invalid: {}",
            result["validation_message"].as_str().unwrap_or("unknown reason")
        ));
    }
    if let Some(issues) = result["lint_issues"].as_array() {
        lines.push(format!("Lint issues ({}):", issues.len()));
        lines.extend(issues.iter().filter_map(|i| i.as_str()).map(|i| format!("  {}", i)));
    }
    lines.join("\n")
}
