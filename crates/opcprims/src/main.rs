mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "opcprims", version, about = "Open Pixel Control codec CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). `RUST_LOG` takes precedence when set.
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "OPCPRIMS_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::EncodeKind;

    #[test]
    fn parses_encode_pixels_subcommand() {
        let cli = Cli::try_parse_from([
            "opcprims",
            "encode",
            "pixels",
            "--channel",
            "1",
            "--colors",
            "0000FF,00FF00",
        ])
        .expect("encode args should parse");

        match cli.command {
            Command::Encode(args) => match args.kind {
                EncodeKind::Pixels(pixels) => {
                    assert_eq!(pixels.channel, 1);
                    assert_eq!(pixels.colors, vec!["0000FF", "00FF00"]);
                }
                other => panic!("unexpected encode kind: {other:?}"),
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_decode_with_hex_system_id() {
        let cli = Cli::try_parse_from([
            "opcprims",
            "decode",
            "capture.bin",
            "--system-id",
            "0x0001",
            "--data-format",
            "int-array",
            "--chunk-size",
            "3",
        ])
        .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.receiver.system_id, 0x0001);
                assert_eq!(args.chunk_size, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_channel_out_of_range() {
        let err = Cli::try_parse_from(["opcprims", "encode", "pixels", "--channel", "256"])
            .expect_err("channel 256 should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_decode_frames_mode_from_stdin() {
        let cli = Cli::try_parse_from([
            "opcprims", "--format", "json", "decode", "--frames", "--hex",
        ])
        .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert!(args.frames);
                assert!(args.hex);
                assert!(args.input.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
