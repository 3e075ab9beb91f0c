//! Pixel stream example: writes a few frames into a buffer, then reads them
//! back through a receiver listening on channel 1.
//!
//! Run with:
//!   cargo run --example pixel-stream

use std::io::Cursor;

use opcprims::frame::{
    pixels, FrameReader, FrameWriter, Message, PixelData, ReceiverConfig, FADECANDY_SYSTEM_ID,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = FrameWriter::new(Vec::new());

    // A short red-to-blue gradient for channel 1.
    let gradient: Vec<u32> = (0..8u8)
        .map(|i| pixels::pack_rgb(255 - i * 32, 0, i * 32))
        .collect();
    writer.set_pixel_colors(1, &PixelData::IntArray(gradient))?;

    // Addressed to channel 2; the receiver below drops it.
    writer.set_pixel_colors(2, &PixelData::from(vec![0xFFu8, 0xFF, 0xFF]))?;

    // Broadcast SysEx for the default system id.
    writer.sysex_command(0, 0xFFFF, 0x0001, b"hello")?;

    // Foreign system id; dropped.
    writer.sysex_command(0, FADECANDY_SYSTEM_ID, 0x0002, &[0x00])?;
    writer.flush()?;

    let wire = writer.into_inner();
    eprintln!("[writer] {} bytes on the wire", wire.len());

    let config = ReceiverConfig::default()
        .with_channel(1)
        .with_data_format(pixels::DataFormat::IntArray);
    let mut reader = FrameReader::with_config(Cursor::new(wire), config);

    while let Ok(message) = reader.read_message() {
        match message {
            Message::SetPixelColors { channel, pixels } => {
                eprintln!(
                    "[reader] channel={channel} pixels={:06X?}",
                    pixels.to_ints()
                );
            }
            Message::SysEx { channel, sysex } => {
                eprintln!(
                    "[reader] channel={channel} sysex command=0x{:04X} data={}",
                    sysex.command_id,
                    String::from_utf8_lossy(&sysex.data)
                );
            }
        }
    }

    Ok(())
}
