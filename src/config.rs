//! Configuration management for sheet-ranges.
//!
//! Handles:
//! - Command-line argument parsing
//! - Layered TOML configuration (built-in < user-global < project < CLI)

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::form::{is_hex_color, RangeForm};

/// File name searched for in the working directory and its ancestors
pub const PROJECT_CONFIG_FILE: &str = ".sheet-ranges.toml";

const BUILTIN_CONFIG: &str = include_str!("../resources/config/default.toml");

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "sheet-ranges")]
#[command(about = "Manage non-overlapping named ranges on spreadsheet sheets")]
#[command(version)]
pub struct Args {
    /// Explicit configuration file, replacing project config discovery
    #[arg(long, global = true, help = "Path to a sheet-ranges TOML config file")]
    pub config: Option<PathBuf>,

    /// Log level override
    #[arg(
        long,
        global = true,
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an empty range file
    New {
        file: PathBuf,
        /// Workbook name, defaults to the file stem
        #[arg(long)]
        name: Option<String>,
        /// Sheet names in order, defaults to the configured sheets
        #[arg(long = "sheet")]
        sheets: Vec<String>,
    },
    /// Validate and add a range
    Add {
        file: PathBuf,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Remove a range by id and sheet
    Remove {
        file: PathBuf,
        #[arg(long)]
        id: String,
        #[arg(long)]
        sheet: usize,
    },
    /// Change fields of a committed range
    Update {
        file: PathBuf,
        #[arg(long)]
        id: String,
        #[command(flatten)]
        changes: UpdateArgs,
    },
    /// List committed ranges by sheet
    List { file: PathBuf },
    /// Audit a range file
    Check {
        file: PathBuf,
        /// Keep re-checking whenever the file changes
        #[arg(long)]
        watch: bool,
    },
}

/// Raw range fields, passed through the range form
#[derive(Debug, Clone, ClapArgs)]
pub struct RangeArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub sheet: String,
    #[arg(long, allow_hyphen_values = true)]
    pub row_start: String,
    #[arg(long, allow_hyphen_values = true)]
    pub row_end: String,
    #[arg(long, allow_hyphen_values = true)]
    pub col_start: String,
    #[arg(long, allow_hyphen_values = true)]
    pub col_end: String,
    #[arg(long)]
    pub color: Option<String>,
}

impl From<RangeArgs> for RangeForm {
    fn from(args: RangeArgs) -> Self {
        RangeForm {
            name: args.name,
            row_start: args.row_start,
            row_end: args.row_end,
            col_start: args.col_start,
            col_end: args.col_end,
            sheet_index: args.sheet,
            color: args.color,
        }
    }
}

#[derive(Debug, Clone, ClapArgs)]
pub struct UpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub sheet: Option<usize>,
    #[arg(long, allow_hyphen_values = true)]
    pub row_start: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub row_end: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub col_start: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub col_end: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
}

/// One configuration file as written on disk
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub palette: Option<Vec<String>>,
    pub default_sheets: Option<Vec<String>>,
    pub log_level: Option<String>,
}

/// Combined configuration from all sources
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Colors assigned in turn to ranges added without one
    pub palette: Vec<String>,
    /// Sheet names used by `new` when none are given
    pub default_sheets: Vec<String>,
    pub log_level: String,
    pub user_config_path: Option<PathBuf>,
    pub project_config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from the process command line and working directory
    pub fn from_args_and_env() -> Result<(Self, Command)> {
        let args = Args::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args.command))
    }

    /// Create configuration from already parsed arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read working directory")?;
        let user_config = user_config_path();
        Self::resolve(
            args.config.as_deref(),
            args.log_level.as_deref(),
            &cwd,
            user_config.as_deref(),
        )
    }

    /// Layer every source on top of the built-in defaults.
    ///
    /// `explicit` replaces project discovery and must exist; the user and
    /// project files are skipped when absent.
    pub fn resolve(
        explicit: Option<&Path>,
        log_level: Option<&str>,
        cwd: &Path,
        user_config: Option<&Path>,
    ) -> Result<Self> {
        let mut config = Self::builtin();

        if let Some(path) = user_config.filter(|p| p.is_file()) {
            config.apply(load_config_file(path)?, path)?;
            config.user_config_path = Some(path.to_path_buf());
        }

        let project = match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => find_project_config(cwd),
        };

        if let Some(path) = project {
            config.apply(load_config_file(&path)?, &path)?;
            config.project_config_path = Some(path);
        }

        if let Some(level) = log_level {
            config.log_level = level.to_string();
        }
        validate_log_level(&config.log_level)?;

        Ok(config)
    }

    /// Built-in defaults embedded in the binary
    pub fn builtin() -> Self {
        let mut config = Self::minimal();
        match toml::from_str::<ConfigFile>(BUILTIN_CONFIG) {
            Ok(file) => {
                if let Err(e) = config.apply(file, Path::new("<built-in>")) {
                    log::warn!("Invalid built-in config: {}. Using minimal defaults.", e);
                    return Self::minimal();
                }
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse built-in config: {}. Using minimal defaults.",
                    e
                );
            }
        }
        config
    }

    fn minimal() -> Self {
        Config {
            palette: vec!["#3B82F6".to_string()],
            default_sheets: vec!["Sheet1".to_string()],
            log_level: "info".to_string(),
            user_config_path: None,
            project_config_path: None,
        }
    }

    fn apply(&mut self, file: ConfigFile, source: &Path) -> Result<()> {
        if let Some(palette) = file.palette {
            if let Some(bad) = palette.iter().find(|c| !is_hex_color(c)) {
                bail!(
                    "Invalid palette color '{}' in {} (expected #RRGGBB)",
                    bad,
                    source.display()
                );
            }
            self.palette = palette;
        }

        if let Some(sheets) = file.default_sheets {
            if sheets.is_empty() {
                bail!(
                    "default_sheets in {} must name at least one sheet",
                    source.display()
                );
            }
            self.default_sheets = sheets;
        }

        if let Some(level) = file.log_level {
            self.log_level = level;
        }

        Ok(())
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }
}

/// `<config dir>/sheet-ranges/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sheet-ranges").join("config.toml"))
}

/// Find the nearest project config in `start` or one of its ancestors
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config TOML: {}", path.display()))
}

fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<log::LevelFilter>()
        .map(|_| ())
        .with_context(|| format!("Unknown log level '{}'", level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config() {
        let config = Config::builtin();
        assert_eq!(config.palette.len(), 6);
        assert_eq!(config.palette[0], "#3B82F6");
        assert_eq!(config.default_sheets, vec!["Sheet1".to_string()]);
        assert_eq!(config.log_level, "info");
        assert!(!config.has_project_config());
    }

    #[test]
    fn test_parse_add_command() {
        let args = Args::try_parse_from([
            "sheet-ranges",
            "add",
            "ranges.json",
            "--name",
            "Totals",
            "--sheet",
            "1",
            "--row-start",
            "-1",
            "--row-end",
            "4",
            "--col-start",
            "0",
            "--col-end",
            "2",
        ])
        .unwrap();

        match args.command {
            Command::Add { file, range } => {
                assert_eq!(file, PathBuf::from("ranges.json"));
                assert_eq!(range.row_start, "-1");
                let proposal = RangeForm::from(range).parse().unwrap();
                assert_eq!(proposal.sheet_index, 1);
                assert_eq!(proposal.row_start, -1);
            }
            other => panic!("Expected add command, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "sheet-ranges",
            "check",
            "ranges.json",
            "--watch",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(matches!(args.command, Command::Check { watch: true, .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let parsed = toml::from_str::<ConfigFile>("pallete = []");
        assert!(parsed.is_err());
    }
}
