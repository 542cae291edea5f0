use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vouch",
    about = "Vouch: structural comparison and assertion of JSON and XML payloads",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Scenario settings (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Context variable, as KEY=VALUE (repeatable)
    #[arg(long = "var", global = true, value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Payload file to publish into the context before running
    #[arg(long, global = true)]
    pub context: Option<PathBuf>,

    /// Origin the --context payload is published under
    #[arg(long, global = true, default_value = "ResponseData")]
    pub origin: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare an expected payload with an actual one
    Compare(CompareArgs),
    /// Assert the value and type of one field
    Assert(AssertArgs),
    /// Find the first matching document in a folder
    Scan(ScanArgs),
    /// Expand {key} placeholders in text
    Expand(ExpandArgs),
    /// List the leaves of a payload as context keys
    Flatten(FlattenArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    pub expected: PathBuf,
    pub actual: PathBuf,
    /// Path scope to compare (defaults to the configured scope)
    #[arg(short, long)]
    pub scope: Option<String>,
    /// Key name to ignore wherever it appears (repeatable)
    #[arg(short, long = "tolerate")]
    pub tolerate: Vec<String>,
    /// Treat payloads as XML
    #[arg(long)]
    pub xml: bool,
}

#[derive(Args)]
pub struct AssertArgs {
    pub actual: PathBuf,
    #[arg(short, long)]
    pub path: String,
    #[arg(long)]
    pub value: String,
    /// null, boolean, number, string, array or object
    #[arg(short = 't', long = "type")]
    pub type_name: String,
    #[arg(long)]
    pub xml: bool,
}

#[derive(Args)]
pub struct ScanArgs {
    pub dir: String,
    /// Expected payload; every candidate is compared against it
    #[arg(short, long, conflicts_with = "field")]
    pub expected: Option<PathBuf>,
    #[arg(short, long)]
    pub scope: Option<String>,
    #[arg(short, long = "tolerate")]
    pub tolerate: Vec<String>,
    /// Field to assert on every candidate instead of a full comparison
    #[arg(long, requires_all = ["value", "type_name"])]
    pub field: Option<String>,
    #[arg(long)]
    pub value: Option<String>,
    #[arg(long = "type")]
    pub type_name: Option<String>,
    #[arg(long)]
    pub xml: bool,
}

#[derive(Args)]
pub struct ExpandArgs {
    pub text: String,
    /// Substitute flat placeholders only, leaving unknown ones in place
    #[arg(long)]
    pub shallow: bool,
    /// Coerce the result: string, number, boolean, array or object
    #[arg(long = "as")]
    pub target: Option<String>,
}

#[derive(Args)]
pub struct FlattenArgs {
    pub file: PathBuf,
    /// Prefix keys with this origin
    #[arg(long = "under")]
    pub under: Option<String>,
    #[arg(long)]
    pub xml: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compare() {
        let cli = Cli::try_parse_from(["vouch", "compare", "a.json", "b.json"]).unwrap();
        if let Command::Compare(args) = cli.command {
            assert_eq!(args.expected, PathBuf::from("a.json"));
            assert!(args.scope.is_none());
            assert!(!args.xml);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_compare_with_scope_and_tolerance() {
        let cli = Cli::try_parse_from([
            "vouch", "compare", "a.xml", "b.xml", "--xml", "-s", "$.r", "-t", "ts", "-t", "id",
        ])
        .unwrap();
        if let Command::Compare(args) = cli.command {
            assert!(args.xml);
            assert_eq!(args.scope.as_deref(), Some("$.r"));
            assert_eq!(args.tolerate, vec!["ts", "id"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "vouch", "expand", "{A}", "--var", "A=1", "--var", "B=x", "--format", "json", "-v",
        ])
        .unwrap();
        assert_eq!(cli.vars, vec!["A=1", "B=x"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert_eq!(cli.origin, "ResponseData");
    }

    #[test]
    fn parse_assert() {
        let cli = Cli::try_parse_from([
            "vouch", "assert", "r.json", "-p", "$.id", "--value", "7", "-t", "number",
        ])
        .unwrap();
        if let Command::Assert(args) = cli.command {
            assert_eq!(args.path, "$.id");
            assert_eq!(args.type_name, "number");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn scan_field_requires_value_and_type() {
        assert!(Cli::try_parse_from(["vouch", "scan", "dir", "--field", "$.a"]).is_err());
        assert!(Cli::try_parse_from([
            "vouch", "scan", "dir", "--field", "$.a", "--value", "1", "--type", "number",
        ])
        .is_ok());
    }

    #[test]
    fn scan_modes_conflict() {
        assert!(Cli::try_parse_from([
            "vouch", "scan", "dir", "-e", "x.json", "--field", "$.a", "--value", "1", "--type", "number",
        ])
        .is_err());
    }

    #[test]
    fn parse_flatten() {
        let cli = Cli::try_parse_from(["vouch", "flatten", "p.json", "--under", "RequestData"]).unwrap();
        assert!(matches!(cli.command, Command::Flatten(FlattenArgs { under: Some(_), .. })));
    }
}
