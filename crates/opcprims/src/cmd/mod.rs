use clap::{Args, Subcommand, ValueEnum};
use opcprims_frame::{DataFormat, ReceiverConfig};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one frame and print its wire bytes.
    Encode(EncodeArgs),
    /// Decode a captured byte stream and print received messages.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(subcommand)]
    pub kind: EncodeKind,
}

#[derive(Subcommand, Debug)]
pub enum EncodeKind {
    /// SetPixelColors frame from RRGGBB colors.
    Pixels(PixelsArgs),
    /// SysEx frame.
    Sysex(SysexArgs),
    /// Frame with an arbitrary command byte and payload.
    Frame(RawFrameArgs),
}

#[derive(Args, Debug)]
pub struct PixelsArgs {
    /// Target channel (0 = broadcast).
    #[arg(long, short = 'c', default_value = "0", value_parser = parse_u8)]
    pub channel: u8,
    /// Pixel colors as RRGGBB (comma-separated, optional `#` or `0x` prefix).
    #[arg(long, value_delimiter = ',')]
    pub colors: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SysexArgs {
    /// Target channel (0 = broadcast).
    #[arg(long, short = 'c', default_value = "0", value_parser = parse_u8)]
    pub channel: u8,
    /// System id placed in front of the data.
    #[arg(long, default_value = "0xFFFF", value_parser = parse_u16)]
    pub system_id: u16,
    /// Sysex command id. When omitted, --data must already start with it.
    #[arg(long, value_parser = parse_u16)]
    pub command_id: Option<u16>,
    /// Data bytes as hex.
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Args, Debug)]
pub struct RawFrameArgs {
    /// Target channel (0 = broadcast).
    #[arg(long, short = 'c', default_value = "0", value_parser = parse_u8)]
    pub channel: u8,
    /// Command byte.
    #[arg(long, value_parser = parse_u8)]
    pub command: u8,
    /// Payload bytes as hex.
    #[arg(long)]
    pub payload: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to read. Default: stdin.
    pub input: Option<PathBuf>,
    /// Input is hex text instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Feed the decoder this many bytes at a time (at most 65536).
    #[arg(long, default_value = "8192", value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: u64,
    /// Print every complete frame, skipping channel and system id filtering.
    #[arg(long)]
    pub frames: bool,
    #[command(flatten)]
    pub receiver: ReceiverArgs,
}

#[derive(Args, Debug)]
pub struct ReceiverArgs {
    /// Channel to listen on. Broadcast (0) frames are always accepted.
    #[arg(long, default_value = "0", env = "OPCPRIMS_CHANNEL", value_parser = parse_u8)]
    pub channel: u8,
    /// System id accepted for SysEx messages.
    #[arg(
        long,
        default_value = "0xFFFF",
        env = "OPCPRIMS_SYSTEM_ID",
        value_parser = parse_u16
    )]
    pub system_id: u16,
    /// Pixel representation for SetPixelColors messages.
    #[arg(long, value_enum, default_value = "buffer", env = "OPCPRIMS_DATA_FORMAT")]
    pub data_format: DataFormatArg,
}

impl ReceiverArgs {
    pub fn to_config(&self) -> ReceiverConfig {
        ReceiverConfig::default()
            .with_channel(self.channel)
            .with_system_id(self.system_id)
            .with_data_format(self.data_format.into())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DataFormatArg {
    Buffer,
    IntArray,
}

impl From<DataFormatArg> for DataFormat {
    fn from(arg: DataFormatArg) -> Self {
        match arg {
            DataFormatArg::Buffer => DataFormat::Buffer,
            DataFormatArg::IntArray => DataFormat::IntArray,
        }
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a decimal or `0x`-prefixed hex number.
fn parse_number(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => input.parse::<u64>(),
    };
    parsed.map_err(|err| format!("invalid number {input:?}: {err}"))
}

pub fn parse_u8(input: &str) -> Result<u8, String> {
    let value = parse_number(input)?;
    u8::try_from(value).map_err(|_| format!("{value} is out of range 0-255"))
}

pub fn parse_u16(input: &str) -> Result<u16, String> {
    let value = parse_number(input)?;
    u16::try_from(value).map_err(|_| format!("{value} is out of range 0-65535"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_and_hex_numbers() {
        assert_eq!(parse_u8("7").unwrap(), 7);
        assert_eq!(parse_u8("0xff").unwrap(), 255);
        assert_eq!(parse_u16("0xFFFF").unwrap(), 0xFFFF);
        assert_eq!(parse_u16(" 513 ").unwrap(), 513);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!(parse_u8("256").is_err());
        assert!(parse_u16("0x10000").is_err());
        assert!(parse_u8("0xzz").is_err());
        assert!(parse_u8("-1").is_err());
    }

    #[test]
    fn receiver_args_build_config() {
        let args = ReceiverArgs {
            channel: 3,
            system_id: 1,
            data_format: DataFormatArg::IntArray,
        };
        let config = args.to_config();
        assert_eq!(config.channel, 3);
        assert_eq!(config.system_id, 1);
        assert_eq!(config.data_format, DataFormat::IntArray);
    }
}
