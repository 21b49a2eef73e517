//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. Global flags (`--debug`, `--config`,
//! `--help`, `--version`) may appear anywhere; the first positional argument selects
//! the command and defaults to `run`.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the adaptation daemon
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        app: Option<String>,
    },
    /// Print the day curve for a date
    Preview {
        debug_enabled: bool,
        config_dir: Option<String>,
        date: Option<String>,
        step_minutes: Option<u32>,
        display: Option<String>,
        app: Option<String>,
        reference: Option<f64>,
        json: bool,
    },
    /// Write manual brightness and contrast
    Set {
        debug_enabled: bool,
        config_dir: Option<String>,
        brightness: u8,
        contrast: u8,
        display: Option<String>,
    },
    /// Run the daemon against a fast-forwarded clock
    Simulate {
        debug_enabled: bool,
        config_dir: Option<String>,
        start_time: String,
        end_time: String,
        app: Option<String>,
        log_file: Option<String>,
    },
    /// Detailed help for one command, or the command list
    Help { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Options that consume the following argument, with their canonical name.
const VALUE_OPTIONS: &[(&str, &str)] = &[
    ("--config", "config"),
    ("-c", "config"),
    ("--app", "app"),
    ("-a", "app"),
    ("--date", "date"),
    ("--step", "step"),
    ("--display", "display"),
    ("--reference", "reference"),
    ("--log", "log"),
    ("-l", "log"),
];

/// Command options without a value.
const FLAG_OPTIONS: &[(&str, &str)] = &[("--json", "json")];

#[derive(Default)]
struct RawArgs {
    debug_enabled: bool,
    options: Vec<(&'static str, String)>,
    positionals: Vec<String>,
}

impl RawArgs {
    fn option(&self, name: &str) -> Option<String> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
    }

    fn flag(&self, name: &str) -> bool {
        self.options.iter().any(|(key, _)| *key == name)
    }

    /// Names of options given that `command` does not accept.
    fn unsupported(&self, allowed: &[&str]) -> Option<&'static str> {
        self.options
            .iter()
            .map(|(key, _)| *key)
            .find(|key| *key != "config" && !allowed.contains(key))
    }
}

fn usage_error(message: &str) -> ParsedArgs {
    log_warning!("{}", message);
    ParsedArgs {
        action: CliAction::ShowHelpDueToError,
    }
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        // Help and version take precedence over everything else
        if args_vec
            .iter()
            .any(|arg| arg == "--version" || arg == "-V" || arg == "-v")
        {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if args_vec.iter().any(|arg| arg == "--help" || arg == "-h") {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        let mut raw = RawArgs::default();
        let mut i = 0;
        while i < args_vec.len() {
            let arg = &args_vec[i];
            if arg == "--debug" || arg == "-d" {
                raw.debug_enabled = true;
            } else if let Some((flag, name)) = VALUE_OPTIONS
                .iter()
                .copied()
                .find(|(flag, _)| *flag == arg.as_str())
            {
                match args_vec.get(i + 1) {
                    Some(value) if !value.starts_with('-') => {
                        raw.options.push((name, value.clone()));
                        i += 1;
                    }
                    _ => return usage_error(&format!("Missing value for {flag}")),
                }
            } else if let Some((_, name)) = FLAG_OPTIONS
                .iter()
                .copied()
                .find(|(flag, _)| *flag == arg.as_str())
            {
                raw.options.push((name, String::new()));
            } else if arg.starts_with('-') && arg.parse::<f64>().is_err() {
                return usage_error(&format!("Unknown option: {arg}"));
            } else {
                raw.positionals.push(arg.clone());
            }
            i += 1;
        }

        let command = raw.positionals.first().cloned();
        let rest = raw.positionals.get(1..).unwrap_or_default();
        let config_dir = raw.option("config");
        let debug_enabled = raw.debug_enabled;

        match command.as_deref() {
            None | Some("run") | Some("r") => {
                if let Some(extra) = rest.first() {
                    return usage_error(&format!("Unexpected argument for run: {extra}"));
                }
                if let Some(option) = raw.unsupported(&["app"]) {
                    return usage_error(&format!("Option --{option} is not supported by run"));
                }
                ParsedArgs {
                    action: CliAction::Run {
                        debug_enabled,
                        config_dir,
                        app: raw.option("app"),
                    },
                }
            }
            Some("preview") | Some("p") => {
                if let Some(extra) = rest.first() {
                    return usage_error(&format!("Unexpected argument for preview: {extra}"));
                }
                if let Some(option) =
                    raw.unsupported(&["app", "date", "step", "display", "reference", "json"])
                {
                    return usage_error(&format!(
                        "Option --{option} is not supported by preview"
                    ));
                }

                let step_minutes = match raw.option("step").map(|s| s.parse::<u32>()) {
                    None => None,
                    Some(Ok(step)) if step > 0 => Some(step),
                    Some(_) => return usage_error("Invalid --step: expected minutes > 0"),
                };
                let reference = match raw.option("reference").map(|s| s.parse::<f64>()) {
                    None => None,
                    Some(Ok(percent)) if (0.0..=100.0).contains(&percent) => Some(percent),
                    Some(_) => return usage_error("Invalid --reference: expected 0-100"),
                };

                ParsedArgs {
                    action: CliAction::Preview {
                        debug_enabled,
                        config_dir,
                        date: raw.option("date"),
                        step_minutes,
                        display: raw.option("display"),
                        app: raw.option("app"),
                        reference,
                        json: raw.flag("json"),
                    },
                }
            }
            Some("set") | Some("s") => {
                if let Some(option) = raw.unsupported(&["display"]) {
                    return usage_error(&format!("Option --{option} is not supported by set"));
                }
                let [brightness, contrast] = rest else {
                    return usage_error(
                        "Usage: daylightr set <brightness> <contrast> [--display ID]",
                    );
                };
                match (brightness.parse::<u8>(), contrast.parse::<u8>()) {
                    (Ok(brightness), Ok(contrast)) if brightness <= 100 && contrast <= 100 => {
                        ParsedArgs {
                            action: CliAction::Set {
                                debug_enabled,
                                config_dir,
                                brightness,
                                contrast,
                                display: raw.option("display"),
                            },
                        }
                    }
                    _ => usage_error("Brightness and contrast must be between 0 and 100"),
                }
            }
            Some("simulate") | Some("S") => {
                if let Some(option) = raw.unsupported(&["app", "log"]) {
                    return usage_error(&format!(
                        "Option --{option} is not supported by simulate"
                    ));
                }
                let [start_time, end_time] = rest else {
                    return usage_error(
                        "Usage: daylightr simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\"",
                    );
                };
                ParsedArgs {
                    action: CliAction::Simulate {
                        debug_enabled,
                        config_dir,
                        start_time: start_time.clone(),
                        end_time: end_time.clone(),
                        app: raw.option("app"),
                        log_file: raw.option("log"),
                    },
                }
            }
            Some("help") | Some("h") => ParsedArgs {
                action: CliAction::Help {
                    command: rest.first().cloned(),
                },
            },
            Some(unknown) => usage_error(&format!("Unknown command: {unknown}")),
        }
    }

    /// Parse command-line arguments from the environment.
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("daylightr [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run, r [--app NAME]    Adapt displays continuously (default)");
    log_indented!("preview, p             Print brightness and contrast across a day");
    log_indented!("set, s <b> <c>         Write brightness and contrast once");
    log_indented!("simulate, S <start> <end>  Run against a fast-forwarded clock");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}
