use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use opcprims_frame::hex::encode_hex;
use opcprims_frame::{Command, Frame, Message, PixelData, HEADER_SIZE};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    channel: u8,
    command: &'a str,
    length: usize,
    wire_size: usize,
    hex: String,
}

/// Print an encoded frame. `wire` always starts with a complete header.
pub fn print_encoded(wire: &[u8], format: OutputFormat) {
    if let OutputFormat::Raw = format {
        print_raw(wire);
        return;
    }

    let (channel, command) = match wire {
        [channel, command, ..] if wire.len() >= HEADER_SIZE => (*channel, Command::from(*command)),
        _ => (0, Command::SetPixelColors),
    };
    let out = EncodedOutput {
        channel,
        command: command.name(),
        length: wire.len().saturating_sub(HEADER_SIZE),
        wire_size: wire.len(),
        hex: encode_hex(wire),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "COMMAND", "LENGTH", "WIRE"])
                .add_row(vec![
                    out.channel.to_string(),
                    out.command.to_string(),
                    out.length.to_string(),
                    out.hex,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "channel={} command={} length={} wire={}",
                out.channel, out.command, out.length, out.hex
            );
        }
        OutputFormat::Raw => {}
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    channel: u8,
    command: &'a str,
    command_byte: u8,
    length: usize,
    payload: String,
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    let out = FrameOutput {
        channel: frame.channel,
        command: frame.command.name(),
        command_byte: frame.command.as_u8(),
        length: frame.payload.len(),
        payload: encode_hex(&frame.payload),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "COMMAND", "LENGTH", "PAYLOAD"])
                .add_row(vec![
                    out.channel.to_string(),
                    format!("{} (0x{:02X})", out.command, out.command_byte),
                    out.length.to_string(),
                    out.payload,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "channel={} command={} (0x{:02X}) length={} payload={}",
                out.channel, out.command, out.command_byte, out.length, out.payload
            );
        }
        OutputFormat::Raw => print_raw(&frame.payload),
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum PixelsOutput {
    Buffer(String),
    IntArray(Vec<u32>),
}

impl From<&PixelData> for PixelsOutput {
    fn from(pixels: &PixelData) -> Self {
        match pixels {
            PixelData::Buffer(bytes) => PixelsOutput::Buffer(encode_hex(bytes)),
            PixelData::IntArray(ints) => PixelsOutput::IntArray(ints.clone()),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessageOutput {
    SetPixelColors {
        channel: u8,
        pixel_count: usize,
        pixels: PixelsOutput,
    },
    Sysex {
        channel: u8,
        system_id: u16,
        command_id: u16,
        data: String,
    },
}

impl From<&Message> for MessageOutput {
    fn from(message: &Message) -> Self {
        match message {
            Message::SetPixelColors { channel, pixels } => MessageOutput::SetPixelColors {
                channel: *channel,
                pixel_count: pixels.pixel_count(),
                pixels: pixels.into(),
            },
            Message::SysEx { channel, sysex } => MessageOutput::Sysex {
                channel: *channel,
                system_id: sysex.system_id,
                command_id: sysex.command_id,
                data: encode_hex(&sysex.data),
            },
        }
    }
}

pub fn print_message(message: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&MessageOutput::from(message)),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "TYPE", "DETAIL", "DATA"]);
            match message {
                Message::SetPixelColors { channel, pixels } => {
                    table.add_row(vec![
                        channel.to_string(),
                        "set_pixel_colors".to_string(),
                        format!("{} pixels", pixels.pixel_count()),
                        pixels_text(pixels),
                    ]);
                }
                Message::SysEx { channel, sysex } => {
                    table.add_row(vec![
                        channel.to_string(),
                        "sysex".to_string(),
                        format!(
                            "system=0x{:04X} command=0x{:04X}",
                            sysex.system_id, sysex.command_id
                        ),
                        encode_hex(&sysex.data),
                    ]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => match message {
            Message::SetPixelColors { channel, pixels } => {
                println!(
                    "channel={} set_pixel_colors pixels={} data={}",
                    channel,
                    pixels.pixel_count(),
                    pixels_text(pixels)
                );
            }
            Message::SysEx { channel, sysex } => {
                println!(
                    "channel={} sysex system=0x{:04X} command=0x{:04X} data={}",
                    channel,
                    sysex.system_id,
                    sysex.command_id,
                    encode_hex(&sysex.data)
                );
            }
        },
        OutputFormat::Raw => match message {
            Message::SetPixelColors { pixels, .. } => print_raw(&pixels.to_bytes()),
            Message::SysEx { sysex, .. } => print_raw(&sysex.data),
        },
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn pixels_text(pixels: &PixelData) -> String {
    match pixels {
        PixelData::Buffer(bytes) => encode_hex(bytes),
        PixelData::IntArray(ints) => ints
            .iter()
            .map(|pixel| format!("{pixel:06X}"))
            .collect::<Vec<_>>()
            .join(","),
    }
}
