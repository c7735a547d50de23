//! Command-line front end for waveform extraction and caption parsing.
//!
//! Results are printed to stdout as JSON; logs go to stderr and the log file.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use wavecue::config::{self, AppSettings};
use wavecue::logging;
use wavecue::subtitles;
use wavecue::waveform::{self, AmplitudeMethod};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    let level = if options.verbose { "debug" } else { "info" };
    if let Err(err) = logging::init(level) {
        eprintln!("Logging disabled: {err}");
    }
    let load_settings = || config::load_or_default().map_err(|err| err.to_string());

    match options.command {
        Command::Waveform {
            media,
            overrides,
            stream,
        } => {
            let config = overrides
                .apply(&load_settings()?)
                .decoder_config()
                .map_err(|err| err.to_string())?;
            if stream {
                print_stream(&media, &config)
            } else {
                let waveform =
                    waveform::waveform_from_file(&media, &config).map_err(|err| err.to_string())?;
                print_json(&waveform)
            }
        }
        Command::Subtitles { path } => print_json(&subtitles::parse_subtitle_file(&path)),
        Command::FindCaptions { media, lang } => {
            let lang = match lang {
                Some(lang) => lang,
                None => load_settings()?.subtitles.preferred_language,
            };
            let (path, cues) = subtitles::load_captions_for_media(&media, &lang);
            print_json(&CaptionLookup { path, cues })
        }
        Command::Config { write_default } => {
            // Writing defaults must not depend on the current file being valid.
            let report = if write_default {
                let settings = AppSettings::default();
                let path = config::save(&settings).map_err(|err| err.to_string())?;
                ConfigReport { path, settings }
            } else {
                ConfigReport {
                    path: config::config_path().map_err(|err| err.to_string())?,
                    settings: load_settings()?,
                }
            };
            print_json(&report)
        }
    }
}

#[derive(Serialize)]
struct CaptionLookup {
    path: Option<PathBuf>,
    cues: Vec<subtitles::SubtitleCue>,
}

#[derive(Serialize)]
struct ConfigReport {
    path: PathBuf,
    settings: AppSettings,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, value).map_err(|err| err.to_string())?;
    writeln!(out).map_err(|err| err.to_string())
}

fn print_stream(media: &Path, config: &waveform::DecoderConfig) -> Result<(), String> {
    let frames = waveform::waveform_stream(media, config).map_err(|err| err.to_string())?;
    let mut out = BufWriter::new(io::stdout().lock());
    for frame in frames {
        let frame = frame.map_err(|err| err.to_string())?;
        let line = serde_json::to_string(&frame).map_err(|err| err.to_string())?;
        match writeln!(out, "{line}") {
            Ok(()) => {}
            // Reader went away (e.g. piped into `head`); dropping the stream stops the decoder.
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
            Err(err) => return Err(err.to_string()),
        }
    }
    match out.flush() {
        Err(err) if err.kind() != io::ErrorKind::BrokenPipe => Err(err.to_string()),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    command: Command,
    verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Waveform {
        media: PathBuf,
        overrides: WaveformOverrides,
        stream: bool,
    },
    Subtitles {
        path: PathBuf,
    },
    FindCaptions {
        media: PathBuf,
        lang: Option<String>,
    },
    Config {
        write_default: bool,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
struct WaveformOverrides {
    method: Option<AmplitudeMethod>,
    resolution_ms: Option<u32>,
    sample_rate: Option<u32>,
}

impl WaveformOverrides {
    fn apply(&self, settings: &AppSettings) -> config::WaveformSettings {
        let mut waveform = settings.waveform.clone();
        if let Some(method) = self.method {
            waveform.amplitude_method = method;
        }
        if let Some(resolution_ms) = self.resolution_ms {
            waveform.frame_duration_ms = resolution_ms;
        }
        if let Some(sample_rate) = self.sample_rate {
            waveform.sample_rate = sample_rate;
        }
        waveform
    }
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>, String> {
    let mut positionals: Vec<String> = Vec::new();
    let mut flags: Vec<&'static str> = Vec::new();
    let mut overrides = WaveformOverrides::default();
    let mut lang: Option<String> = None;
    let mut stream = false;
    let mut write_default = false;
    let mut verbose = false;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "-v" | "--verbose" => verbose = true,
            "--stream" => {
                flags.push("--stream");
                stream = true;
            }
            "--write-default" => {
                flags.push("--write-default");
                write_default = true;
            }
            "--method" => {
                idx += 1;
                flags.push("--method");
                let value = flag_value(&args, idx, "--method")?;
                overrides.method =
                    Some(value.parse::<AmplitudeMethod>().map_err(|err| err.to_string())?);
            }
            "--resolution" => {
                idx += 1;
                flags.push("--resolution");
                overrides.resolution_ms = Some(parse_number(&args, idx, "--resolution")?);
            }
            "--sample-rate" => {
                idx += 1;
                flags.push("--sample-rate");
                overrides.sample_rate = Some(parse_number(&args, idx, "--sample-rate")?);
            }
            "--lang" => {
                idx += 1;
                flags.push("--lang");
                lang = Some(flag_value(&args, idx, "--lang")?.to_string());
            }
            unknown if unknown.starts_with('-') => {
                return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
            }
            value => positionals.push(value.to_string()),
        }
        idx += 1;
    }

    let mut positionals = positionals.into_iter();
    let Some(name) = positionals.next() else {
        return Err(format!("A command is required\n\n{}", help_text()));
    };
    let (command, allowed): (Command, &[&str]) = match name.as_str() {
        "waveform" => (
            Command::Waveform {
                media: required_path(positionals.next(), "waveform", "<media>")?,
                overrides,
                stream,
            },
            &["--method", "--resolution", "--sample-rate", "--stream"],
        ),
        "subtitles" => (
            Command::Subtitles {
                path: required_path(positionals.next(), "subtitles", "<caption-file>")?,
            },
            &[],
        ),
        "find-captions" => (
            Command::FindCaptions {
                media: required_path(positionals.next(), "find-captions", "<media>")?,
                lang,
            },
            &["--lang"],
        ),
        "config" => (Command::Config { write_default }, &["--write-default"]),
        other => return Err(format!("Unknown command: {other}\n\n{}", help_text())),
    };
    if let Some(extra) = positionals.next() {
        return Err(format!("Unexpected argument for {name}: {extra}"));
    }
    if let Some(flag) = flags.iter().find(|flag| !allowed.contains(*flag)) {
        return Err(format!("{flag} is not valid for {name}"));
    }
    Ok(Some(CliOptions { command, verbose }))
}

fn flag_value<'a>(args: &'a [String], idx: usize, flag: &str) -> Result<&'a str, String> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_number(args: &[String], idx: usize, flag: &str) -> Result<u32, String> {
    let value = flag_value(args, idx, flag)?;
    value
        .parse()
        .map_err(|_| format!("{flag} expects a positive integer, got {value}"))
}

fn required_path(value: Option<String>, command: &str, name: &str) -> Result<PathBuf, String> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| format!("{command} requires {name}"))
}

fn help_text() -> String {
    [
        "wavecue",
        "",
        "Usage:",
        "  wavecue waveform <media> [--method rms|peak] [--resolution <ms>] [--sample-rate <hz>] [--stream]",
        "  wavecue subtitles <caption-file>",
        "  wavecue find-captions <media> [--lang <code>]",
        "  wavecue config [--write-default]",
        "",
        "Options:",
        "  -v, --verbose   Log at debug level (RUST_LOG takes precedence)",
        "  -h, --help      Show this help",
    ]
    .join("\n")
}
