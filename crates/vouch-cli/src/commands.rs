use std::fs;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::{json, Map, Value};
use tracing::debug;
use vouch_context::{flatten, Origin};
use vouch_diff::{parse_document, DiffReport, Difference, Format, ScanMatch};
use vouch_scenario::{infer_cell, Scenario, ScenarioConfig, ScenarioError, TargetType};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut scenario = build_scenario(&cli)?;
    let out = cli.format;
    match cli.command {
        Command::Compare(args) => cmd_compare(&mut scenario, args, out),
        Command::Assert(args) => cmd_assert(&mut scenario, args, out),
        Command::Scan(args) => cmd_scan(&mut scenario, args, out),
        Command::Expand(args) => cmd_expand(&scenario, args, out),
        Command::Flatten(args) => cmd_flatten(&scenario, args, out),
    }
}

fn build_scenario(cli: &Cli) -> anyhow::Result<Scenario> {
    let config = match &cli.config {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::default(),
    };
    let scenario = Scenario::with_config(config);

    for var in &cli.vars {
        let (key, value) = parse_var(var)?;
        scenario.set_var(key, value)?;
    }

    if let Some(path) = &cli.context {
        let origin: Origin = cli.origin.parse().map_err(anyhow::Error::msg)?;
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read context payload {}", path.display()))?;
        let written = scenario.publish_payload(origin, &text)?;
        debug!(%origin, keys = written, "context payload published");
    }
    Ok(scenario)
}

/// Split `KEY=VALUE`, typing the value the way table cells are typed.
fn parse_var(var: &str) -> anyhow::Result<(&str, Value)> {
    let (key, value) = var
        .split_once('=')
        .with_context(|| format!("expected KEY=VALUE, got {var:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("empty variable name in {var:?}");
    }
    Ok((key, infer_cell(value)))
}

fn payload_format(xml: bool) -> Format {
    if xml {
        Format::Xml
    } else {
        Format::Json
    }
}

fn cmd_compare(scenario: &mut Scenario, args: CompareArgs, out: OutputFormat) -> anyhow::Result<()> {
    let format = payload_format(args.xml);
    scenario
        .load_expected_file(format, &args.expected)
        .with_context(|| format!("cannot load {}", args.expected.display()))?;
    scenario
        .load_actual_file(format, &args.actual)
        .with_context(|| format!("cannot load {}", args.actual.display()))?;
    scenario.set_tolerant_keys(args.tolerate)?;

    let scope = args
        .scope
        .unwrap_or_else(|| scenario.config().default_scope.clone());
    match scenario.compare(format, &scope) {
        Ok(report) => print_report(&report, out),
        Err(ScenarioError::Mismatch(report)) => {
            print_report(&report, out)?;
            bail!("{} difference(s) found", report.len())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_assert(scenario: &mut Scenario, args: AssertArgs, out: OutputFormat) -> anyhow::Result<()> {
    let format = payload_format(args.xml);
    scenario
        .load_actual_file(format, &args.actual)
        .with_context(|| format!("cannot load {}", args.actual.display()))?;
    scenario.assert_field(format, &args.path, &args.value, &args.type_name)?;

    match out {
        OutputFormat::Json => println!("{}", json!({"path": args.path, "ok": true})),
        OutputFormat::Text => println!(
            "{} {} is {} {}",
            "✓".green().bold(),
            args.path.bold(),
            args.type_name.cyan(),
            args.value
        ),
    }
    Ok(())
}

fn cmd_scan(scenario: &mut Scenario, args: ScanArgs, out: OutputFormat) -> anyhow::Result<()> {
    let format = payload_format(args.xml);
    let scope = args
        .scope
        .clone()
        .unwrap_or_else(|| scenario.config().default_scope.clone());

    let found = match (&args.field, &args.expected) {
        (Some(field), _) => {
            let value = args.value.as_deref().unwrap_or_default();
            let type_name = args.type_name.as_deref().unwrap_or_default();
            scenario.assert_folder_field(format, &args.dir, field, value, type_name)?
        }
        (None, Some(expected)) => {
            scenario
                .load_expected_file(format, expected)
                .with_context(|| format!("cannot load {}", expected.display()))?;
            scenario.set_tolerant_keys(args.tolerate.clone())?;
            scenario.compare_folder(format, &args.dir, &scope)?
        }
        (None, None) => bail!("scan needs --expected or --field"),
    };
    print_scan(&found, out);
    Ok(())
}

fn cmd_expand(scenario: &Scenario, args: ExpandArgs, out: OutputFormat) -> anyhow::Result<()> {
    let value = if args.shallow {
        Value::String(scenario.expand_shallow(&args.text)?)
    } else if let Some(target) = &args.target {
        let target: TargetType = target.parse()?;
        scenario.expand_as(&args.text, target)?
    } else {
        Value::String(scenario.expand(&args.text)?)
    };

    match (out, &value) {
        (OutputFormat::Json, _) => println!("{value}"),
        (OutputFormat::Text, Value::String(text)) => println!("{text}"),
        (OutputFormat::Text, other) => println!("{other}"),
    }
    Ok(())
}

fn cmd_flatten(scenario: &Scenario, args: FlattenArgs, out: OutputFormat) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let tree = parse_document(&text, payload_format(args.xml), &scenario.config().xml)?;
    let origin: Option<Origin> = args
        .under
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let pairs = flatten_keys(&tree, origin);
    match out {
        OutputFormat::Json => {
            let members: Map<String, Value> = pairs.into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&members)?);
        }
        OutputFormat::Text => {
            for (key, value) in pairs {
                println!("{} = {}", key.bold(), value);
            }
        }
    }
    Ok(())
}

fn flatten_keys(tree: &Value, origin: Option<Origin>) -> Vec<(String, Value)> {
    flatten(tree)
        .into_iter()
        .map(|(path, value)| match origin {
            Some(origin) => (origin.key(&path), value),
            None => (path, value),
        })
        .collect()
}

fn print_report(report: &DiffReport, out: OutputFormat) -> anyhow::Result<()> {
    match out {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text if report.is_empty() => {
            println!("{} Expected payload matched actual payload", "✓".green().bold())
        }
        OutputFormat::Text => {
            println!("{} {} difference(s)", "✗".red().bold(), report.len());
            for difference in report {
                println!("  {}", render_difference(difference));
            }
        }
    }
    Ok(())
}

fn render_difference(difference: &Difference) -> String {
    let kind = difference.kind().yellow();
    let path = difference.path().bold();
    match difference {
        Difference::TypeMismatch {
            expected,
            actual,
            expected_type,
            actual_type,
            ..
        } => format!(
            "{kind} {path}: expected {} {}, actual {} {}",
            expected_type.to_string().cyan(),
            expected.to_string().green(),
            actual_type.to_string().cyan(),
            actual.to_string().red()
        ),
        Difference::ValueMismatch { expected, actual, .. } => format!(
            "{kind} {path}: expected {}, actual {}",
            expected.to_string().green(),
            actual.to_string().red()
        ),
        Difference::MissingKey { missing_in, .. } | Difference::MissingArrayIndex { missing_in, .. } => {
            format!("{kind} {path}: missing in {}", missing_in.to_string().red())
        }
    }
}

fn print_scan(found: &ScanMatch, out: OutputFormat) {
    match out {
        OutputFormat::Json => println!(
            "{}",
            json!({"file": found.file.display().to_string(), "tried": found.tried})
        ),
        OutputFormat::Text => println!(
            "{} {} matched after {} candidate(s)",
            "✓".green().bold(),
            found.file.display().to_string().bold(),
            found.tried
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn run(dir: &TempDir, args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["vouch".to_string()];
        argv.extend(args.iter().map(|a| a.replace("{dir}", &dir.path().display().to_string())));
        run_command(Cli::try_parse_from(argv)?)
    }

    #[test]
    fn vars_are_typed() {
        assert_eq!(parse_var("A=1").unwrap(), ("A", json!(1)));
        assert_eq!(parse_var(" B = x=y").unwrap(), ("B", json!("x=y")));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=1").is_err());
    }

    #[test]
    fn compare_passes_and_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("e.json"), r#"{"a": 1, "b": {"c": 2}}"#).unwrap();
        fs::write(dir.path().join("same.json"), r#"{"a": 1, "b": {"c": 2}}"#).unwrap();
        fs::write(dir.path().join("other.json"), r#"{"a": 1, "b": {"c": 3}}"#).unwrap();

        run(&dir, &["compare", "{dir}/e.json", "{dir}/same.json"]).unwrap();
        let err = run(&dir, &["compare", "{dir}/e.json", "{dir}/other.json"]).unwrap_err();
        assert_eq!(err.to_string(), "1 difference(s) found");
        run(&dir, &["compare", "{dir}/e.json", "{dir}/other.json", "-t", "c"]).unwrap();
    }

    #[test]
    fn variables_reach_payloads() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("e.json"), r#"{"id": {Id}}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"id": 9}"#).unwrap();
        run(&dir, &["compare", "{dir}/e.json", "{dir}/a.json", "--var", "Id=9"]).unwrap();
    }

    #[test]
    fn assert_and_scan() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("inbox")).unwrap();
        fs::write(dir.path().join("inbox/1.xml"), "<m><code>1</code></m>").unwrap();
        fs::write(dir.path().join("inbox/2.xml"), "<m><code>2</code></m>").unwrap();

        run(&dir, &["assert", "{dir}/inbox/2.xml", "--xml", "-p", "$.m.code", "--value", "2", "-t", "number"])
            .unwrap();
        run(&dir, &["scan", "{dir}/inbox", "--xml", "--field", "$.m.code", "--value", "2", "--type", "number"])
            .unwrap();
        assert!(run(&dir, &["scan", "{dir}/inbox", "--xml"]).is_err());
    }

    #[test]
    fn context_payload_feeds_expansion() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("resp.json"), r#"{"token": "abc"}"#).unwrap();
        run(&dir, &["expand", "Bearer {ResponseData_token}", "--context", "{dir}/resp.json"]).unwrap();
        assert!(run(&dir, &["expand", "x", "--context", "{dir}/resp.json", "--origin", "Nowhere"]).is_err());
    }

    #[test]
    fn flatten_keys_under_origin() {
        let tree = json!({"a": [1, {"b": true}]});
        let pairs = flatten_keys(&tree, Some(Origin::RequestData));
        assert_eq!(
            pairs,
            vec![
                ("RequestData_a[0]".to_string(), json!(1)),
                ("RequestData_a[1].b".to_string(), json!(true)),
            ]
        );
        assert_eq!(flatten_keys(&tree, None)[0].0, "a[0]");
    }
}
