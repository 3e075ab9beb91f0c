use bytes::BytesMut;
use opcprims_frame::hex::decode_hex;
use opcprims_frame::{
    encode_frame, encode_pixel_colors, encode_sysex, encode_sysex_command, PixelData,
};

use crate::cmd::{EncodeArgs, EncodeKind, PixelsArgs, RawFrameArgs, SysexArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut wire = BytesMut::new();

    match &args.kind {
        EncodeKind::Pixels(pixels) => encode_pixels(pixels, &mut wire)?,
        EncodeKind::Sysex(sysex) => encode_sysex_args(sysex, &mut wire)?,
        EncodeKind::Frame(frame) => encode_raw(frame, &mut wire)?,
    }

    tracing::debug!(len = wire.len(), "encoded frame");
    print_encoded(&wire, format);
    Ok(SUCCESS)
}

fn encode_pixels(args: &PixelsArgs, wire: &mut BytesMut) -> CliResult<()> {
    let colors = args
        .colors
        .iter()
        .map(|color| parse_color(color))
        .collect::<CliResult<Vec<u32>>>()?;
    encode_pixel_colors(args.channel, &PixelData::IntArray(colors), wire)
        .map_err(|err| frame_error("encode failed", err))
}

fn encode_sysex_args(args: &SysexArgs, wire: &mut BytesMut) -> CliResult<()> {
    let data = hex_arg("--data", args.data.as_deref())?;
    let result = match args.command_id {
        Some(command_id) => {
            encode_sysex_command(args.channel, args.system_id, command_id, &data, wire)
        }
        None => encode_sysex(args.channel, args.system_id, &data, wire),
    };
    result.map_err(|err| frame_error("encode failed", err))
}

fn encode_raw(args: &RawFrameArgs, wire: &mut BytesMut) -> CliResult<()> {
    let payload = hex_arg("--payload", args.payload.as_deref())?;
    encode_frame(args.channel, args.command, &payload, wire)
        .map_err(|err| frame_error("encode failed", err))
}

fn hex_arg(name: &str, value: Option<&str>) -> CliResult<Vec<u8>> {
    match value {
        Some(text) => {
            decode_hex(text).map_err(|err| CliError::new(USAGE, format!("{name}: {err}")))
        }
        None => Ok(Vec::new()),
    }
}

/// Parse `RRGGBB`, `#RRGGBB` or `0xRRGGBB` into a packed pixel.
fn parse_color(input: &str) -> CliResult<u32> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CliError::new(
            USAGE,
            format!("color {input:?} must be exactly 6 hex digits"),
        ));
    }

    u32::from_str_radix(digits, 16)
        .map_err(|err| CliError::new(USAGE, format!("invalid color {input:?}: {err}")))
}
