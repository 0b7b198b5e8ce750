//! basc-drv - Compiler driver.
//!
//! Orchestrates the pipeline over one source file:
//!
//! ```text
//! Source (.BAS)
//!      |
//!   [Tokenizer]  -> token stream          (-t stops here)
//!      |
//!   [Parser]     -> line models           (-p stops here)
//!      |
//!   [Validator]  -> resolved/typed model  (-v stops here)
//!      |
//!   [Generator]  -> PDP-11 assembly text  (-g echoes it)
//!      |
//!   <input>.MAC
//! ```
//!
//! Stages run to completion and accumulate diagnostics; the driver
//! checks the error counter at every stage boundary, prints the batch
//! to stderr and aborts with a non-zero status when any stage
//! recorded errors. No output file is written unless every stage
//! succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use thiserror::Error;

use basc_gen::{AsmOutput, Generator};
use basc_lex::{TokenKind, Tokenizer};
use basc_par::{Parser, SourceModel};
use basc_sem::Validator;
use basc_util::Handler;

/// Command-line usage errors.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Input file not specified.")]
    InputNotSpecified,
}

/// Driver configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Input source path.
    pub input_file: PathBuf,
    /// Suppress the banner.
    pub quiet: bool,
    /// Show tokenization and stop.
    pub tokenize_only: bool,
    /// Show parsing result and stop.
    pub parsing_only: bool,
    /// Show validation result and stop.
    pub validation_only: bool,
    /// Echo the generated assembly to stdout.
    pub show_generation: bool,
}

impl Config {
    /// Parse command-line arguments (without the program name).
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Config, UsageError> {
        let mut config = Config::default();
        for arg in args {
            match arg.as_str() {
                "-q" | "--quiet" => config.quiet = true,
                "-t" | "--tokenizeonly" => config.tokenize_only = true,
                "-p" | "--parsingonly" => config.parsing_only = true,
                "-v" | "--validationonly" => config.validation_only = true,
                "-g" | "--showgeneration" => config.show_generation = true,
                option if option.starts_with('-') => {
                    return Err(UsageError::UnknownOption(option.to_string()));
                }
                _ => config.input_file = PathBuf::from(arg),
            }
        }
        if config.input_file.as_os_str().is_empty() {
            return Err(UsageError::InputNotSpecified);
        }
        Ok(config)
    }

    /// Output path: the input path with its extension replaced.
    pub fn output_file(&self) -> PathBuf {
        self.input_file.with_extension("MAC")
    }
}

/// One compiler invocation.
pub struct Session {
    pub config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the pipeline per the configuration.
    pub fn run(&self) -> Result<()> {
        let source_text = fs::read_to_string(&self.config.input_file).with_context(|| {
            format!(
                "Failed to open the input file {}",
                self.config.input_file.display()
            )
        })?;

        if self.config.tokenize_only {
            show_tokenization(&source_text);
            return Ok(());
        }

        let handler = Handler::new();
        let mut model = SourceModel::new();
        parse_stage(&source_text, &mut model, &handler);

        if self.config.parsing_only {
            report_diagnostics(&handler);
            for line in &model.lines {
                println!("{:#?}", line);
            }
            return Ok(());
        }

        let errors = report_diagnostics(&handler);
        if errors > 0 {
            bail!("Parsing ERRORS: {}", errors);
        }

        {
            let mut validator = Validator::new(&mut model, &handler);
            validator.process();
        }

        if self.config.validation_only {
            report_diagnostics(&handler);
            for line in &model.lines {
                println!("{:#?}", line);
            }
            return Ok(());
        }

        let errors = report_diagnostics(&handler);
        if errors > 0 {
            bail!("Validation ERRORS: {}", errors);
        }

        let mut output = AsmOutput::new();
        {
            let mut generator = Generator::new(&model, &mut output, &handler);
            generator.process();
        }

        let errors = report_diagnostics(&handler);
        if errors > 0 {
            bail!("Generation ERRORS: {}", errors);
        }

        let text = output.text();
        if self.config.show_generation {
            print!("{}", text);
        }

        let output_path = self.config.output_file();
        write_output(&output_path, &self.config.input_file, &text)?;

        Ok(())
    }
}

/// Full pipeline over in-memory source, for tests and tooling.
/// Returns the generated assembly text.
pub fn compile_to_assembly(source: &str) -> Result<String> {
    let handler = Handler::new();
    let mut model = SourceModel::new();
    parse_stage(source, &mut model, &handler);
    check_stage(&handler, "Parsing")?;

    {
        let mut validator = Validator::new(&mut model, &handler);
        validator.process();
    }
    check_stage(&handler, "Validation")?;

    let mut output = AsmOutput::new();
    {
        let mut generator = Generator::new(&model, &mut output, &handler);
        generator.process();
    }
    check_stage(&handler, "Generation")?;

    Ok(output.text())
}

fn parse_stage(source: &str, model: &mut SourceModel, handler: &Handler) {
    let tokenizer = Tokenizer::new(source);
    let mut parser = Parser::new(tokenizer, handler);
    while let Some(line) = parser.parse_next_line() {
        model.lines.push(line);
    }
}

fn check_stage(handler: &Handler, stage: &str) -> Result<()> {
    let diagnostics = handler.drain();
    if diagnostics.is_empty() {
        return Ok(());
    }
    let messages: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
    bail!("{} ERRORS: {}\n{}", stage, diagnostics.len(), messages.join("\n"))
}

/// Print the accumulated diagnostics to stderr, returning the count.
fn report_diagnostics(handler: &Handler) -> usize {
    let diagnostics = handler.drain();
    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic);
    }
    diagnostics.len()
}

fn show_tokenization(source: &str) {
    let mut tokenizer = Tokenizer::new(source);
    loop {
        let token = tokenizer.next_token();
        println!("{}", token);
        if token.kind == TokenKind::Eot {
            break;
        }
    }
}

fn write_output(path: &Path, input: &Path, text: &str) -> Result<()> {
    let mut contents = format!("; Generated with basc on {}\n;\n", input.display());
    contents.push_str(text);
    fs::write(path, contents)
        .with_context(|| format!("Failed to open the output file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::parse(vec!["prog.bas".to_string()]).unwrap();
        assert_eq!(config.input_file, PathBuf::from("prog.bas"));
        assert!(!config.quiet);
        assert!(!config.tokenize_only);
    }

    #[test]
    fn test_config_flags() {
        let args = ["-q", "-t", "prog.bas"].map(String::from);
        let config = Config::parse(args).unwrap();
        assert!(config.quiet);
        assert!(config.tokenize_only);
    }

    #[test]
    fn test_config_long_flags() {
        let args = ["--parsingonly", "--showgeneration", "prog.bas"].map(String::from);
        let config = Config::parse(args).unwrap();
        assert!(config.parsing_only);
        assert!(config.show_generation);
    }

    #[test]
    fn test_config_unknown_option() {
        let args = ["-x", "prog.bas"].map(String::from);
        let err = Config::parse(args).unwrap_err();
        assert!(matches!(err, UsageError::UnknownOption(_)));
    }

    #[test]
    fn test_config_missing_input() {
        let err = Config::parse(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, UsageError::InputNotSpecified));
    }

    #[test]
    fn test_output_path_replaces_extension() {
        let config = Config::parse(vec!["dir/prog.bas".to_string()]).unwrap();
        assert_eq!(config.output_file(), PathBuf::from("dir/prog.MAC"));
    }

    #[test]
    fn test_output_path_without_extension() {
        let config = Config::parse(vec!["prog".to_string()]).unwrap();
        assert_eq!(config.output_file(), PathBuf::from("prog.MAC"));
    }

    #[test]
    fn test_compile_to_assembly_smoke() {
        let text = compile_to_assembly("10 PRINT \"HI\"\n").unwrap();
        assert!(text.contains("START:"));
        assert!(text.contains("\t.END\tSTART"));
    }

    #[test]
    fn test_compile_to_assembly_reports_stage() {
        let err = compile_to_assembly("10 GOTO 99\n").unwrap_err();
        assert!(err.to_string().contains("Validation ERRORS"));
    }
}
